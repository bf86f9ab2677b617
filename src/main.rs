//! Example orbit demonstrating hierarchy propagation

use srt_scene::prelude::*;

/// Spins its owner around the local Y axis
struct Orbit {
    speed: f32,
}

impl Behavior for Orbit {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut scene = Scene::with_config(SceneConfig::default().with_name("Orbit Demo"));
    let graph = scene.spawn_graph("Bodies");

    let sun = scene.spawn_named_node("Sun");
    let planet = scene.spawn_named_node("Planet");
    let moon = scene.spawn_named_node("Moon");

    scene.set_local_scale(sun, Vec3::splat(2.0))?;
    scene.set_local_location(planet, Vec3::new(5.0, 0.0, 0.0))?;
    scene.set_local_scale(planet, Vec3::splat(0.5))?;
    scene.set_local_location(moon, Vec3::new(3.0, 0.0, 0.0))?;
    scene.set_parent(planet, Some(sun))?;
    scene.set_parent(moon, Some(planet))?;

    for node in [sun, planet, moon] {
        scene.add_object(graph, node)?;
    }

    let sun_orbit = scene.spawn_behavior(Orbit { speed: 0.4 });
    let planet_orbit = scene.spawn_behavior(Orbit { speed: 1.5 });
    scene.add_behavior(sun, sun_orbit)?;
    scene.add_behavior(planet, planet_orbit)?;

    let dt = 1.0 / 4.0;
    for step in 0..8 {
        for (node, orbit) in [(sun, sun_orbit), (planet, planet_orbit)] {
            let speed = scene.behavior::<Orbit>(orbit)?.speed;
            let rotation = scene.local_transform(node)?.rotation;
            scene.set_local_rotation(node, Quat::from_rotation_y(speed * dt) * rotation)?;
        }
        update_hierarchy(&mut scene)?;

        let moon_world = scene.world_transform(moon)?;
        log::info!("Step {step}: moon at {:?}", moon_world.location);
    }

    let uniforms = collect_uniforms(&scene, graph)?;
    log::info!("Packed {} model uniforms", uniforms.len());

    let snapshot = SceneSnapshot::capture(&scene)?;
    println!("{}", snapshot.to_ron_string()?);
    Ok(())
}
