mod common;

use std::sync::{Arc, atomic::Ordering};

use common::{MockOutput, RecordingSink};
use pmomediarenderer::{
    avtransport::{AVTRANSPORT_SERVICE_ID, AVTransport, TransportState, TransportVar},
    output::{PlaybackEvent, TrackMetadata},
};
use pmoupnp::{actions::ActionInvocation, services::UpnpService};

fn create_transport() -> (Arc<MockOutput>, Arc<RecordingSink>, AVTransport) {
    let output = MockOutput::new();
    let sink = RecordingSink::new();
    let transport = AVTransport::new(output.clone(), sink.clone(), None).unwrap();
    (output, sink, transport)
}

fn invocation(action: &str) -> ActionInvocation {
    ActionInvocation::new(action).with_input("InstanceID", "0")
}

#[test]
fn test_initial_event() {
    let (_output, sink, _transport) = create_transport();

    let notifications = sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].service_id, AVTRANSPORT_SERVICE_ID);
    assert_eq!(notifications[0].names, vec!["LastChange"]);
    let doc = &notifications[0].values[0];
    assert!(doc.contains("TransportState val=&quot;STOPPED&quot;"));
    // Les variables d'argument et de position ne sont pas publiées.
    assert!(!doc.contains("A_ARG_TYPE"));
    assert!(!doc.contains("RelativeTimePosition"));
}

#[test]
fn test_play_without_uri() {
    let (output, _sink, transport) = create_transport();
    assert_eq!(transport.play().unwrap_err().code(), 702);
    assert_eq!(transport.transport_state(), TransportState::Stopped);
    assert!(output.calls().is_empty());
}

#[test]
fn test_play_pause_stop() {
    let (output, sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    sink.clear();

    transport.play().unwrap();
    assert_eq!(transport.transport_state(), TransportState::Playing);
    assert_eq!(transport.value(TransportVar::TransportState), "PLAYING");
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:00");
    assert_eq!(
        transport.value(TransportVar::CurrentTransportActions),
        "Pause,Stop,Seek"
    );
    // Un seul évènement pour l'état et les actions.
    let notifications = sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].values[0].contains("TransportState val=&quot;PLAYING&quot;"));
    assert!(notifications[0].values[0].contains("CurrentTransportActions"));

    transport.pause().unwrap();
    assert_eq!(transport.transport_state(), TransportState::PausedPlayback);

    transport.play().unwrap();
    assert_eq!(transport.transport_state(), TransportState::Playing);

    transport.stop().unwrap();
    assert_eq!(transport.transport_state(), TransportState::Stopped);

    assert_eq!(
        output.calls(),
        vec!["set_uri http://host/a.flac", "play", "pause", "resume", "stop"]
    );
}

#[test]
fn test_pause_from_stopped_is_refused() {
    let (_output, sink, transport) = create_transport();
    sink.clear();

    let err = transport.pause().unwrap_err();
    assert_eq!(err.code(), 701);
    assert!(err.to_string().contains("Play"));
    assert_eq!(transport.transport_state(), TransportState::Stopped);
    assert_eq!(sink.len(), 0);
}

#[test]
fn test_play_failure_returns_to_stopped() {
    let (output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    output.fail_play.store(true, Ordering::SeqCst);

    assert_eq!(transport.play().unwrap_err().code(), 704);
    assert_eq!(transport.transport_state(), TransportState::Stopped);
}

#[test]
fn test_set_uri_while_playing_restarts() {
    let (output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();
    output.clear_calls();

    transport.set_transport_uri("http://host/b.flac", "<DIDL-Lite/>").unwrap();
    assert_eq!(transport.transport_state(), TransportState::Playing);
    assert_eq!(transport.value(TransportVar::AVTransportURI), "http://host/b.flac");
    assert_eq!(
        transport.value(TransportVar::CurrentTrackMetaData),
        "<DIDL-Lite/>"
    );
    assert_eq!(output.calls(), vec!["set_uri http://host/b.flac", "play"]);
}

#[test]
fn test_empty_uri_unloads() {
    let (_output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();

    transport.set_transport_uri("", "").unwrap();
    assert_eq!(transport.transport_state(), TransportState::Stopped);
    assert_eq!(transport.value(TransportVar::NumberOfTracks), "0");
    assert_eq!(transport.value(TransportVar::CurrentTransportActions), "Play");
}

#[test]
fn test_seek() {
    let (output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();

    assert_eq!(transport.seek("ABS_COUNT", "10").unwrap_err().code(), 710);
    assert_eq!(transport.seek("REL_TIME", "1:xx:00").unwrap_err().code(), 711);

    transport.seek("REL_TIME", "0:01:30").unwrap();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:01:30");
    assert!(output.calls().contains(&"seek 90000000000".to_string()));

    // Échec du backend : la position n'est pas modifiée.
    output.fail_seek.store(true, Ordering::SeqCst);
    assert_eq!(transport.seek("REL_TIME", "0:02:00").unwrap_err().code(), 501);
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:01:30");
}

#[test]
fn test_poll_after_seek_restores_backend_position() {
    let (output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();
    transport.pause().unwrap();

    output.set_position(300_000_000_000, 10_000_000_000);
    transport.update_position();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:10");

    // Le backend accepte le seek mais reste à 10 s.
    transport.seek("REL_TIME", "0:01:30").unwrap();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:01:30");

    transport.update_position();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:10");
    transport.update_position();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:10");
}

#[test]
fn test_play_zeroes_position_before_output() {
    let (output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    output.set_position(300_000_000_000, 42_000_000_000);
    transport.update_position();
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:42");

    output.fail_play.store(true, Ordering::SeqCst);
    assert_eq!(transport.play().unwrap_err().code(), 704);
    // Le backend a refusé : seule la remise à zéro préalable est visible.
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:00:00");
    assert_eq!(transport.value(TransportVar::AbsoluteTimePosition), "0:00:00");
    assert_eq!(output.calls().last().map(String::as_str), Some("play"));
}

#[test]
fn test_play_mode() {
    let (_output, _sink, transport) = create_transport();
    transport.set_play_mode("REPEAT_ALL").unwrap();
    assert_eq!(transport.value(TransportVar::CurrentPlayMode), "REPEAT_ALL");
    assert_eq!(transport.set_play_mode("RANDOMLY").unwrap_err().code(), 712);
    assert_eq!(transport.value(TransportVar::CurrentPlayMode), "REPEAT_ALL");
}

#[test]
fn test_end_of_stream() {
    let (_output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();

    transport.on_playback_event(PlaybackEvent::Stopped);
    assert_eq!(transport.transport_state(), TransportState::Stopped);
    assert_eq!(transport.value(TransportVar::AVTransportURI), "");
}

#[test]
fn test_started_next_stream() {
    let (_output, _sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.set_next_transport_uri("http://host/b.flac", "meta-b").unwrap();
    transport.play().unwrap();

    transport.on_playback_event(PlaybackEvent::StartedNextStream);
    assert_eq!(transport.transport_state(), TransportState::Playing);
    assert_eq!(transport.value(TransportVar::AVTransportURI), "http://host/b.flac");
    assert_eq!(transport.value(TransportVar::CurrentTrackMetaData), "meta-b");
    assert_eq!(transport.value(TransportVar::NextAVTransportURI), "");
}

#[test]
fn test_stream_metadata() {
    let (_output, _sink, transport) = create_transport();
    transport.on_metadata(&TrackMetadata {
        title: Some("Blue in Green".to_string()),
        artist: Some("Miles Davis".to_string()),
        ..Default::default()
    });
    let didl = transport.value(TransportVar::CurrentTrackMetaData);
    assert!(didl.contains("Blue in Green"));
    assert!(didl.contains("Miles Davis"));
}

#[test]
fn test_position_updates_are_silent() {
    let (output, sink, transport) = create_transport();
    transport.set_transport_uri("http://host/a.flac", "").unwrap();
    transport.play().unwrap();
    sink.clear();

    output.set_position(180_000_000_000, 61_500_000_000);
    transport.update_position();

    assert_eq!(transport.value(TransportVar::CurrentTrackDuration), "0:03:00");
    assert_eq!(transport.value(TransportVar::RelativeTimePosition), "0:01:01");
    assert_eq!(sink.len(), 0);
}

#[test]
fn test_dispatch() {
    let (_output, _sink, transport) = create_transport();

    let mut inv = invocation("SetAVTransportURI")
        .with_input("CurrentURI", "http://host/a.flac")
        .with_input("CurrentURIMetaData", "");
    assert!(transport.dispatch(&mut inv));

    let mut inv = invocation("GetTransportInfo");
    assert!(transport.dispatch(&mut inv));
    assert_eq!(inv.output("CurrentTransportState"), Some("STOPPED"));
    assert_eq!(inv.output("CurrentSpeed"), Some("1"));

    let mut inv = invocation("GetMediaInfo");
    assert!(transport.dispatch(&mut inv));
    assert_eq!(inv.output("CurrentURI"), Some("http://host/a.flac"));
    assert_eq!(inv.output("NrTracks"), Some("1"));

    let mut inv = invocation("Pause");
    assert!(!transport.dispatch(&mut inv));
    assert_eq!(inv.fault().map(|f| f.code), Some(701));

    let mut inv = ActionInvocation::new("Play").with_input("InstanceID", "3");
    assert!(!transport.dispatch(&mut inv));
    assert_eq!(inv.fault().map(|f| f.code), Some(718));

    let mut inv = ActionInvocation::new("Stop");
    assert!(!transport.dispatch(&mut inv));
    assert_eq!(inv.fault().map(|f| f.code), Some(402));

    let mut inv = invocation("Record");
    assert!(!transport.dispatch(&mut inv));
    assert_eq!(inv.fault().map(|f| f.code), Some(401));
}
