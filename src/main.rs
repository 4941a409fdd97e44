use std::f32::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use trigon::{
    AnimatedProperty, Animator, AppConfig, Axes, Color, Easing, Geometry, Material, Mesh,
    SetupContext, Track, Vector3, primitives,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::new()
        .title("Trigon Shapes")
        .size(1024, 640)
        .clear_color(Color::rgb(0.05, 0.05, 0.08));

    trigon::run_with_config(config, |ctx| {
        let mut animators = match build_scene(ctx) {
            Ok(animators) => animators,
            Err(err) => {
                log::error!("failed to build scene: {err}");
                Vec::new()
            }
        };

        move |frame| {
            frame.camera.set_perspective(
                45f32.to_radians(),
                frame.aspect(),
                0.1,
                100.0,
            );
            for animator in &mut animators {
                animator.update_at(frame.scene, frame.now);
            }
        }
    })?;

    Ok(())
}

/// Adds a cube, a sphere and a pyramid to the scene, each with an animator.
fn build_scene(ctx: &mut SetupContext) -> Result<Vec<Animator>, Box<dyn std::error::Error>> {
    ctx.camera.look_at(
        &Vector3::new(0.0, 3.0, 9.0),
        &Vector3::ZERO,
        &Vector3::new(0.0, 1.0, 0.0),
    );

    let sphere = primitives::sphere(
        1.0,
        primitives::DEFAULT_WIDTH_SEGMENTS,
        primitives::DEFAULT_HEIGHT_SEGMENTS,
    )?;
    let shapes = [
        (
            Geometry::new(ctx.gpu, primitives::cube(1.5))?,
            Color::rgb(0.9, 0.3, 0.25),
            -3.0,
        ),
        (
            Geometry::new(ctx.gpu, sphere)?,
            Color::rgb(0.3, 0.6, 0.95),
            0.0,
        ),
        (
            Geometry::new(ctx.gpu, primitives::pyramid(1.6, 1.8))?,
            Color::rgb(0.95, 0.8, 0.3),
            3.0,
        ),
    ];

    let mut ids = Vec::with_capacity(shapes.len());
    for (geometry, color, x) in shapes {
        let material = Material::basic(ctx.gpu)?;
        material.set_color(ctx.gpu, color)?;

        let mut mesh = Mesh::new(Rc::new(geometry), Rc::new(material));
        mesh.set_position(Vector3::new(x, 0.0, 0.0));
        ids.push(ctx.scene.add(mesh));
    }

    let mut spin = Animator::new(ids[0]);
    spin.add_track(
        Track::new(AnimatedProperty::Rotation, 0.0, TAU, Duration::from_secs(4))
            .looping(true)
            .axes(Axes::XY),
    );

    let mut pulse = Animator::new(ids[1]);
    pulse.add_track(
        Track::new(AnimatedProperty::Scale, 0.6, 1.2, Duration::from_millis(1500))
            .looping(true)
            .easing(Easing::EaseInOut),
    );

    let mut rise = Animator::new(ids[2]);
    rise.add_track(
        Track::new(AnimatedProperty::Position, 0.0, 1.5, Duration::from_secs(3))
            .axes(Axes::Y)
            .easing(Easing::EaseOut),
    )
    .add_animation(
        AnimatedProperty::Rotation,
        0.0,
        TAU,
        Duration::from_secs(6),
        true,
    );

    let mut animators = vec![spin, pulse, rise];
    for animator in &mut animators {
        animator.start();
    }
    Ok(animators)
}
