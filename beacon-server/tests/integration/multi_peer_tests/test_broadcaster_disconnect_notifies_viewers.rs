use beacon_core::ServerEnvelope;
use beacon_server::RelayService;

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_broadcaster_disconnect_notifies_viewers() {
    init_tracing();

    let service = RelayService::new();
    let mut broadcaster = TestPeer::connect(&service);
    let mut first = TestPeer::connect(&service);
    let mut second = TestPeer::connect(&service);

    broadcaster.join_as_broadcaster(&service, "r1").await;
    first.join_as_viewer(&service, "r1").await;
    second.join_as_viewer(&service, "r1").await;

    broadcaster.disconnect(&service);

    // Each viewer sees exactly one offline transition.
    for viewer in [&mut first, &mut second] {
        match viewer.recv_envelope().await {
            ServerEnvelope::BroadcasterStatus { online } => assert!(!online),
            other => panic!("expected broadcaster-status, got {other:?}"),
        }
        viewer.assert_silent();
    }

    // The room survives: it still holds viewers.
    let room = service.rooms().get("r1").expect("room should remain");
    assert!(!room.has_broadcaster());
    assert_eq!(room.viewer_count(), 2);
}
