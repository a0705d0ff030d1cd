use super::document::PnmlFile;

/// Namespace of PNML 2009 documents.
pub const PNML_NAMESPACE: &str = "http://www.pnml.org/version-2009/grammar/pnml";
/// Net type of place/transition nets.
pub const PTNET_TYPE: &str = "http://www.pnml.org/version-2009/grammar/ptnet";

/// What [`normalize_namespace`] found on the root element.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum Declared {
    Expected,
    Missing,
    Foreign(String),
}

/// Make the in-memory document declare `namespace` and report what it declared before.
///
/// Elements are matched by local name, so the outcome only decides what gets logged. The source
/// text is never changed.
pub(crate) fn normalize_namespace(file: &mut PnmlFile, namespace: &str) -> Declared {
    let declared = match file.namespace.take() {
        Some(current) if current == namespace => Declared::Expected,
        Some(current) => Declared::Foreign(current),
        None => Declared::Missing,
    };
    file.namespace = Some(namespace.to_string());
    declared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnml::document::read_document;

    #[test]
    fn adds_missing_namespace() {
        let mut file = read_document("<pnml><net/></pnml>").unwrap();
        assert_eq!(normalize_namespace(&mut file, PNML_NAMESPACE), Declared::Missing);
        assert_eq!(file.namespace.as_deref(), Some(PNML_NAMESPACE));
    }

    #[test]
    fn replaces_foreign_namespace() {
        let mut file = read_document(r#"<pnml xmlns="urn:other"/>"#).unwrap();
        let declared = normalize_namespace(&mut file, PNML_NAMESPACE);
        assert_eq!(declared, Declared::Foreign("urn:other".to_string()));
        assert_eq!(file.namespace.as_deref(), Some(PNML_NAMESPACE));
    }

    #[test]
    fn keeps_expected_namespace() {
        let xml = format!(r#"<pnml xmlns="{PNML_NAMESPACE}"/>"#);
        let mut file = read_document(&xml).unwrap();
        assert_eq!(normalize_namespace(&mut file, PNML_NAMESPACE), Declared::Expected);
    }
}
