mod common;

use std::{sync::Arc, time::Duration};

use common::{MockOutput, RecordingSink};
use pmomediarenderer::{
    MediaRenderer, RendererOptions,
    avtransport::{AVTRANSPORT_SERVICE_ID, TransportVar},
    connectionmanager::CONNECTIONMANAGER_SERVICE_ID,
    output::{PlaybackEvent, TrackMetadata},
    playlist::{PLAYLIST_SERVICE_ID, PlaylistVar},
    renderingcontrol::RENDERINGCONTROL_SERVICE_ID,
};
use pmoupnp::actions::ActionInvocation;

fn create_renderer() -> (Arc<MockOutput>, Arc<RecordingSink>, MediaRenderer) {
    common::init_tracing();
    let output = MockOutput::new();
    let sink = RecordingSink::new();
    let options = RendererOptions {
        poll_interval: Duration::from_millis(20),
        ..Default::default()
    };
    let renderer = MediaRenderer::start(output.clone(), sink.clone(), options).unwrap();
    (output, sink, renderer)
}

/// Attend que `condition` devienne vraie (2 s au plus).
async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

fn play_uri(renderer: &MediaRenderer, uri: &str) {
    let mut inv = ActionInvocation::new("SetAVTransportURI")
        .with_input("InstanceID", "0")
        .with_input("CurrentURI", uri)
        .with_input("CurrentURIMetaData", "");
    assert!(renderer.dispatch(AVTRANSPORT_SERVICE_ID, &mut inv));
    let mut inv = ActionInvocation::new("Play")
        .with_input("InstanceID", "0")
        .with_input("Speed", "1");
    assert!(renderer.dispatch(AVTRANSPORT_SERVICE_ID, &mut inv));
}

#[tokio::test]
async fn test_initial_events_for_all_services() {
    let (_output, sink, renderer) = create_renderer();

    for service_id in renderer.service_ids() {
        assert_eq!(sink.for_service(service_id).len(), 1, "{}", service_id);
    }
    renderer.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_routes_by_service() {
    let (_output, _sink, renderer) = create_renderer();

    let mut inv = ActionInvocation::new("GetVolume")
        .with_input("InstanceID", "0")
        .with_input("Channel", "Master");
    assert!(renderer.dispatch(RENDERINGCONTROL_SERVICE_ID, &mut inv));
    assert_eq!(inv.output("CurrentVolume"), Some("50"));

    let mut inv = ActionInvocation::new("GetProtocolInfo");
    assert!(renderer.dispatch(CONNECTIONMANAGER_SERVICE_ID, &mut inv));

    let mut inv = ActionInvocation::new("TracksMax");
    assert!(renderer.dispatch(PLAYLIST_SERVICE_ID, &mut inv));
    assert_eq!(inv.output("Value"), Some("1000"));

    let mut inv = ActionInvocation::new("GetVolume");
    assert!(!renderer.dispatch("urn:upnp-org:serviceId:Nope", &mut inv));
    assert_eq!(inv.fault().map(|f| f.code), Some(401));

    renderer.shutdown().await;
}

#[tokio::test]
async fn test_playlist_mirrors_transport_state() {
    let (_output, _sink, renderer) = create_renderer();
    play_uri(&renderer, "http://host/a.flac");

    let playlist = renderer.playlist().clone();
    assert!(wait_until(|| playlist.value(PlaylistVar::TransportState) == "Playing").await);

    renderer.shutdown().await;
}

#[tokio::test]
async fn test_output_callbacks_reach_transport() {
    let (output, _sink, renderer) = create_renderer();
    play_uri(&renderer, "http://host/a.flac");
    renderer
        .avtransport()
        .set_next_transport_uri("http://host/b.flac", "")
        .unwrap();

    output.emit_metadata(TrackMetadata {
        title: Some("So What".to_string()),
        ..Default::default()
    });
    let transport = renderer.avtransport().clone();
    assert!(
        wait_until(|| transport
            .value(TransportVar::CurrentTrackMetaData)
            .contains("So What"))
        .await
    );

    output.emit(PlaybackEvent::StartedNextStream);
    assert!(
        wait_until(|| transport.value(TransportVar::AVTransportURI) == "http://host/b.flac")
            .await
    );

    output.emit(PlaybackEvent::Stopped);
    assert!(wait_until(|| transport.value(TransportVar::TransportState) == "STOPPED").await);

    renderer.shutdown().await;
}

#[tokio::test]
async fn test_playlist_follows_gapless_transition() {
    let (output, _sink, renderer) = create_renderer();
    let playlist = renderer.playlist().clone();
    let a = playlist.insert(0, "http://host/a.flac", "").unwrap();
    let b = playlist.insert(a, "http://host/b.flac", "").unwrap();
    playlist.play().unwrap();

    output.emit(PlaybackEvent::StartedNextStream);
    assert!(wait_until(|| playlist.current_id() == Some(b)).await);

    renderer.shutdown().await;
}

#[tokio::test]
async fn test_poller_updates_position() {
    let (output, _sink, renderer) = create_renderer();
    play_uri(&renderer, "http://host/a.flac");
    output.set_position(240_000_000_000, 12_000_000_000);

    let transport = renderer.avtransport().clone();
    assert!(
        wait_until(|| transport.value(TransportVar::RelativeTimePosition) == "0:00:12").await
    );
    assert_eq!(transport.value(TransportVar::CurrentTrackDuration), "0:04:00");

    renderer.shutdown().await;
    assert_eq!(output.calls().last().map(String::as_str), Some("stop"));
}
