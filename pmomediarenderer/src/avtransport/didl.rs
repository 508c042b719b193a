use quick_xml::escape::escape;

use crate::output::TrackMetadata;

const DIDL_HEADER: &str = concat!(
    r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/""#,
    r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#
);

/// Construit le document DIDL-Lite de `CurrentTrackMetaData` à partir des
/// tags du flux.
pub(crate) fn track_metadata_to_didl(meta: &TrackMetadata) -> String {
    let mut item = String::new();
    let mut push = |tag: &str, value: &Option<String>| {
        if let Some(v) = value {
            item.push_str(&format!("<{0}>{1}</{0}>", tag, escape(v.as_str())));
        }
    };

    push("dc:title", &meta.title);
    push("upnp:artist", &meta.artist);
    push("dc:creator", &meta.artist);
    push("upnp:album", &meta.album);
    push("upnp:genre", &meta.genre);
    if let Some(composer) = &meta.composer {
        item.push_str(&format!(
            r#"<upnp:author role="Composer">{}</upnp:author>"#,
            escape(composer.as_str())
        ));
    }

    format!(
        r#"{}<item id="" parentID="0" restricted="1">{}<upnp:class>object.item.audioItem.musicTrack</upnp:class></item></DIDL-Lite>"#,
        DIDL_HEADER, item
    )
}
