use beacon_core::ClientEnvelope;
use beacon_server::{Outgoing, RelayService};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_unjoined_connection_terminates_silently() {
    init_tracing();

    let service = RelayService::new();
    let mut broadcaster = TestPeer::connect(&service);
    broadcaster.join_as_broadcaster(&service, "r1").await;

    let mut idle = TestPeer::connect(&service);

    service.registry().sweep();
    match idle.recv_outgoing().await {
        Outgoing::Probe => {}
        other => panic!("expected a probe, got {other:?}"),
    }

    // The broadcaster acknowledges its probe; the idle connection never does.
    match broadcaster.recv_outgoing().await {
        Outgoing::Probe => {}
        other => panic!("expected a probe, got {other:?}"),
    }
    broadcaster.send(&service, ClientEnvelope::Pong);

    service.registry().sweep();
    match idle.recv_outgoing().await {
        Outgoing::Terminate => {}
        other => panic!("expected terminate, got {other:?}"),
    }

    // The transport closes on Terminate, which runs the disconnect path.
    idle.disconnect(&service);

    // Cleanup for an unjoined session is a no-op: nobody hears about it.
    match broadcaster.recv_outgoing().await {
        Outgoing::Probe => {}
        other => panic!("expected a probe, got {other:?}"),
    }
    broadcaster.assert_silent();
    assert!(service.rooms().contains("r1"));
    assert_eq!(service.registry().len(), 1);
}
