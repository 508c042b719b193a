use tracing::error;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Variables qui portent l'attribut `channel="Master"` dans un `LastChange`.
pub const MASTER_CHANNEL_VARIABLES: [&str; 4] = ["Volume", "VolumeDB", "Mute", "Loudness"];

/// Construit un document `LastChange`.
///
/// ```xml
/// <Event xmlns="urn:schemas-upnp-org:metadata-1-0/RCS/">
///   <InstanceID val="0">
///     <Volume channel="Master" val="16"/>
///   </InstanceID>
/// </Event>
/// ```
///
/// Le builder n'a pas d'état entre deux appels à [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct LastChangeBuilder {
    namespace: String,
    document: Option<Element>,
}

impl LastChangeBuilder {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            document: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `true` si aucune valeur n'a été accumulée depuis le dernier `build`.
    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// Ajoute ou remplace la valeur de `name`.
    ///
    /// La valeur est insérée telle quelle ; l'échappement est fait à la
    /// sérialisation.
    pub fn add(&mut self, name: &str, value: &str) {
        let namespace = &self.namespace;
        let document = self.document.get_or_insert_with(|| {
            let mut event = Element::new("Event");
            event
                .attributes
                .insert("xmlns".to_string(), namespace.clone());
            let mut instance = Element::new("InstanceID");
            instance
                .attributes
                .insert("val".to_string(), "0".to_string());
            event.children.push(XMLNode::Element(instance));
            event
        });

        let Some(instance) = document.get_mut_child("InstanceID") else {
            return;
        };

        if let Some(existing) = instance.get_mut_child(name) {
            existing
                .attributes
                .insert("val".to_string(), value.to_string());
            return;
        }

        let mut elem = Element::new(name);
        if MASTER_CHANNEL_VARIABLES.contains(&name) {
            elem.attributes
                .insert("channel".to_string(), "Master".to_string());
        }
        elem.attributes.insert("val".to_string(), value.to_string());
        instance.children.push(XMLNode::Element(elem));
    }

    /// Sérialise les valeurs accumulées et remet le builder à zéro.
    ///
    /// # Returns
    ///
    /// Le document XML (sans déclaration), ou une chaîne vide si rien n'a été
    /// ajouté.
    pub fn build(&mut self) -> String {
        let Some(document) = self.document.take() else {
            return String::new();
        };

        let config = EmitterConfig::new()
            .perform_indent(false)
            .write_document_declaration(false);

        let mut buf = Vec::new();
        if let Err(e) = document.write_with_config(&mut buf, config) {
            error!("❌ Failed to serialize LastChange event: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RCS_EVENT_NAMESPACE;

    #[test]
    fn test_empty_build() {
        let mut builder = LastChangeBuilder::new(RCS_EVENT_NAMESPACE);
        assert!(builder.is_empty());
        assert_eq!(builder.build(), "");
    }

    #[test]
    fn test_master_channel_and_reset() {
        let mut builder = LastChangeBuilder::new(RCS_EVENT_NAMESPACE);
        builder.add("Volume", "16");
        builder.add("PresetNameList", "FactoryDefaults");

        let doc = builder.build();
        assert!(doc.starts_with("<Event"));
        assert!(doc.contains(r#"xmlns="urn:schemas-upnp-org:metadata-1-0/RCS/""#));
        assert!(doc.contains(r#"<InstanceID val="0">"#));
        assert!(doc.contains(r#"channel="Master""#));
        assert!(doc.contains(r#"val="16""#));
        assert!(doc.contains("<PresetNameList"));
        assert_eq!(doc.matches("channel=").count(), 1);

        assert!(builder.is_empty());
        assert_eq!(builder.build(), "");
    }

    #[test]
    fn test_last_value_wins() {
        let mut builder = LastChangeBuilder::new(RCS_EVENT_NAMESPACE);
        builder.add("Mute", "0");
        builder.add("Mute", "1");

        let doc = builder.build();
        assert_eq!(doc.matches("<Mute").count(), 1);
        assert!(doc.contains(r#"val="1""#));
    }

    #[test]
    fn test_values_are_escaped_by_serializer() {
        let mut builder = LastChangeBuilder::new(RCS_EVENT_NAMESPACE);
        builder.add("AVTransportURI", "http://h/a?b=1&c=2");
        let doc = builder.build();
        assert!(doc.contains("b=1&amp;c=2"));
    }
}
