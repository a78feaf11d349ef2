//! Render through a real server on the loopback interface.

use std::sync::Arc;

use umbra_core::{Camera, Material, RenderSettings, Scene, Sdf3, Thing};
use umbra_math::DVec3;
use umbra_remote::{RemoteError, RemoteRenderer, RpcServer};
use umbra_renderer::{render_pass, Orchestrator, Renderer};

fn scene() -> Scene {
    let settings = RenderSettings {
        width: 12,
        height: 8,
        passes: 2,
        samples: 2,
        bounces: 2,
        workers: 2,
        ..Default::default()
    };
    let camera = Camera::new(
        DVec3::new(0.0, 2.0, 10.0),
        DVec3::ZERO,
        DVec3::Y,
        40.0,
    );
    let mut scene = Scene::new(camera, settings).with_seed(1234);
    scene.add(Thing::new(
        Material::light(DVec3::splat(3.0)),
        Sdf3::sphere(1.0).translate(DVec3::new(2.0, 5.0, 0.0)),
    ));
    scene.add(Thing::new(
        Material::matt(DVec3::new(0.8, 0.3, 0.2)),
        Sdf3::difference(vec![Sdf3::cube(2.0, 2.0, 2.0), Sdf3::sphere(1.3)]),
    ));
    scene.add(Thing::new(
        Material::shadows_only(),
        Sdf3::cube(20.0, 0.2, 20.0).translate(DVec3::new(0.0, -1.1, 0.0)),
    ));
    scene
}

#[test]
fn test_remote_matches_local() {
    let server = RpcServer::bind("127.0.0.1:0")
        .unwrap()
        .with_render_service()
        .start()
        .unwrap();
    let addr = server.local_addr().to_string();

    let scene = scene();
    let local = render_pass(&scene).unwrap();

    let plain = RemoteRenderer::new(addr.clone()).render(&scene).unwrap();
    assert_eq!(plain, local);

    let compressed = RemoteRenderer::new(addr)
        .with_compression(true)
        .render(&scene)
        .unwrap();
    assert_eq!(compressed, local);

    server.stop();
}

#[test]
fn test_orchestrator_over_remote() {
    let server = RpcServer::bind("127.0.0.1:0")
        .unwrap()
        .with_render_service()
        .start()
        .unwrap();
    let remote = RemoteRenderer::new(server.local_addr().to_string()).with_compression(true);

    let scene = scene();
    let renderers: Vec<Arc<dyn Renderer>> = vec![Arc::new(remote)];
    let last = Orchestrator::new(renderers).render(&scene).last().unwrap();
    assert_eq!(last.pass, 2);
    assert_eq!(last.raster.total_rays(), 2 * 2 * 12 * 8);

    server.stop();
}

#[test]
fn test_unknown_method_reported() {
    let server = RpcServer::bind("127.0.0.1:0").unwrap().start().unwrap();

    // Nothing registered, so the render call comes back as a failure
    let remote = RemoteRenderer::new(server.local_addr().to_string());
    match remote.call(&scene()) {
        Err(RemoteError::Service(message)) => assert!(message.contains("Render.render")),
        other => panic!("expected service failure, got {:?}", other.map(|r| r.width)),
    }

    server.stop();
}

#[test]
fn test_stop_unblocks_idle_server() {
    let server = RpcServer::bind("0.0.0.0:0")
        .unwrap()
        .with_render_service()
        .start()
        .unwrap();
    // No client ever connects; stop must still return
    server.stop();
}

#[test]
fn test_bind_failure_is_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    match RpcServer::bind(addr) {
        Err(RemoteError::Io(_)) => {}
        Err(other) => panic!("expected IO error, got {}", other),
        Ok(_) => panic!("bind to a taken port succeeded"),
    }
}
