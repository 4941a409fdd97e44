//! Time-based property animation for meshes.
//!
//! An [`Animator`] is bound to one mesh and holds a list of [`Track`]s. Each
//! track drives one property (position, rotation or scale) from a start value
//! to an end value over a duration. Tracks begin only after
//! [`Animator::start`]; afterwards every [`Animator::update`] samples the
//! elapsed wall-clock time and writes the interpolated value back through the
//! mesh's setters, so the model transform is always rebuilt from identity.
//!
//! ```ignore
//! use std::time::Duration;
//! use trigon::*;
//!
//! let cube = scene.add(mesh);
//! let mut animator = Animator::new(cube);
//! animator
//!     .add_animation(AnimatedProperty::Scale, 1.0, 2.0, Duration::from_secs(2), false)
//!     .add_track(
//!         Track::new(AnimatedProperty::Rotation, 0.0, std::f32::consts::TAU, Duration::from_secs(4))
//!             .looping(true)
//!             .axes(Axes::XY),
//!     );
//! animator.start();
//!
//! // once per frame
//! animator.update(&mut scene);
//! ```
//!
//! # Track States
//!
//! | State     | Meaning                                                 |
//! |-----------|---------------------------------------------------------|
//! | `Idle`    | Added while the animator is not started                 |
//! | `Running` | Sampled on every update                                 |
//! | `Stopped` | A non-looping track reached its duration; updates no-op |
//!
//! Calling [`Animator::start`] again rewinds every track to `Running` from a
//! fresh shared start time.

use std::time::{Duration, Instant};

use crate::mesh::Mesh;
use crate::scene::{MeshId, Scene};
use crate::vector::Vector3;

/// The mesh property a track animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    Position,
    /// Euler angles in radians.
    Rotation,
    Scale,
}

/// Which components of the property a track writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Axes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Axes {
    pub const ALL: Axes = Axes::new(true, true, true);
    pub const X: Axes = Axes::new(true, false, false);
    pub const Y: Axes = Axes::new(false, true, false);
    pub const Z: Axes = Axes::new(false, false, true);
    pub const XY: Axes = Axes::new(true, true, false);

    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    fn write(self, target: &mut Vector3, value: f32) {
        if self.x {
            target.x = value;
        }
        if self.y {
            target.y = value;
        }
        if self.z {
            target.z = value;
        }
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::ALL
    }
}

/// Easing curves applied to a track's linear progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    #[default]
    Linear,
    /// Start slow, accelerate.
    EaseIn,
    /// Start fast, decelerate.
    EaseOut,
    /// Start slow, speed up, then slow down.
    EaseInOut,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Lifecycle of a single track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Idle,
    Running,
    Stopped,
}

/// One property's animation: start and end values over a duration.
#[derive(Clone, Debug)]
pub struct Track {
    property: AnimatedProperty,
    start: f32,
    end: f32,
    duration: Duration,
    looping: bool,
    easing: Easing,
    axes: Axes,
    elapsed: Duration,
    state: TrackState,
}

impl Track {
    /// A non-looping, linear track writing all three axes.
    pub fn new(property: AnimatedProperty, start: f32, end: f32, duration: Duration) -> Self {
        Self {
            property,
            start,
            end,
            duration,
            looping: false,
            easing: Easing::Linear,
            axes: Axes::ALL,
            elapsed: Duration::ZERO,
            state: TrackState::Idle,
        }
    }

    /// When looping, progress wraps every `duration` and the track never stops.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn axes(mut self, axes: Axes) -> Self {
        self.axes = axes;
        self
    }

    pub fn property(&self) -> AnimatedProperty {
        self.property
    }

    pub fn start_value(&self) -> f32 {
        self.start
    }

    pub fn end_value(&self) -> f32 {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Time sampled on the most recent update.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Linear progress in `[0, 1]` after `elapsed` time.
    ///
    /// Looping tracks wrap; zero-length tracks are always complete.
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        let duration = self.duration.as_nanos();
        if duration == 0 {
            return 1.0;
        }

        let elapsed = elapsed.as_nanos();
        if self.looping {
            ((elapsed % duration) as f64 / duration as f64) as f32
        } else {
            (elapsed as f64 / duration as f64).min(1.0) as f32
        }
    }

    /// Interpolated property value after `elapsed` time.
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let t = self.easing.apply(self.progress_at(elapsed));
        self.start + (self.end - self.start) * t
    }

    fn is_finished_at(&self, elapsed: Duration) -> bool {
        self.duration.is_zero() || (!self.looping && elapsed >= self.duration)
    }

    fn apply(&self, mesh: &mut Mesh, value: f32) {
        match self.property {
            AnimatedProperty::Position => {
                let mut position = mesh.position();
                self.axes.write(&mut position, value);
                mesh.set_position(position);
            }
            AnimatedProperty::Rotation => {
                let mut rotation = mesh.rotation();
                self.axes.write(&mut rotation, value);
                mesh.set_rotation(rotation.x, rotation.y, rotation.z);
            }
            AnimatedProperty::Scale => {
                let mut scale = mesh.scale();
                self.axes.write(&mut scale, value);
                mesh.set_scale(scale);
            }
        }
    }
}

/// Drives a set of tracks against one mesh.
#[derive(Clone, Debug)]
pub struct Animator {
    target: MeshId,
    tracks: Vec<Track>,
    started_at: Option<Instant>,
}

impl Animator {
    pub fn new(target: MeshId) -> Self {
        Self {
            target,
            tracks: Vec::new(),
            started_at: None,
        }
    }

    pub fn target(&self) -> MeshId {
        self.target
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Adds a linear track writing all three axes of `property`.
    pub fn add_animation(
        &mut self,
        property: AnimatedProperty,
        start: f32,
        end: f32,
        duration: Duration,
        looping: bool,
    ) -> &mut Self {
        self.add_track(Track::new(property, start, end, duration).looping(looping))
    }

    /// Adds a configured track.
    ///
    /// On a started animator the track runs against the existing start time;
    /// otherwise it stays idle until [`start`](Self::start).
    pub fn add_track(&mut self, mut track: Track) -> &mut Self {
        track.state = if self.started_at.is_some() {
            TrackState::Running
        } else {
            TrackState::Idle
        };
        track.elapsed = Duration::ZERO;
        self.tracks.push(track);
        self
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Records `now` as the shared start time and rewinds every track.
    pub fn start_at(&mut self, now: Instant) {
        self.started_at = Some(now);
        for track in &mut self.tracks {
            track.state = TrackState::Running;
            track.elapsed = Duration::ZERO;
        }
    }

    /// Halts every running track; later updates no-op until restarted.
    pub fn stop(&mut self) {
        self.started_at = None;
        for track in &mut self.tracks {
            if track.state == TrackState::Running {
                track.state = TrackState::Stopped;
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.tracks
            .iter()
            .any(|track| track.state == TrackState::Running)
    }

    pub fn update(&mut self, scene: &mut Scene) {
        self.update_at(scene, Instant::now());
    }

    /// Samples the tracks at `now` and writes the results to the target mesh.
    pub fn update_at(&mut self, scene: &mut Scene, now: Instant) {
        match scene.get_mut(self.target) {
            Some(mesh) => self.apply_at(mesh, now),
            None => log::warn!("animator target {:?} is not in the scene", self.target),
        }
    }

    /// Samples the tracks at `now` and writes the results to `mesh`.
    pub fn apply_at(&mut self, mesh: &mut Mesh, now: Instant) {
        let Some(started_at) = self.started_at else {
            return;
        };
        let elapsed = now.saturating_duration_since(started_at);

        for track in &mut self.tracks {
            if track.state != TrackState::Running {
                continue;
            }

            track.elapsed = elapsed;
            track.apply(mesh, track.value_at(elapsed));

            if track.is_finished_at(elapsed) {
                track.state = TrackState::Stopped;
                log::debug!("{:?} track finished after {:?}", track.property, elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::recording::RecordingContext;
    use crate::geometry::Geometry;
    use crate::material::Material;
    use crate::primitives;
    use std::rc::Rc;

    fn scene_with_cube() -> (Scene, MeshId) {
        let mut ctx = RecordingContext::new();
        let geometry = Rc::new(Geometry::new(&mut ctx, primitives::cube(1.0)).unwrap());
        let material = Rc::new(Material::basic(&mut ctx).unwrap());

        let mut scene = Scene::new();
        let id = scene.add(Mesh::new(geometry, material));
        (scene, id)
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn easing_clamps_and_hits_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.apply(-1.0), 0.0);
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        assert_eq!(Easing::EaseIn.apply(0.5), 0.25);
        assert_eq!(Easing::EaseOut.apply(0.5), 0.75);
    }

    #[test]
    fn linear_track_reaches_midpoint_at_half_duration() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Position, 0.0, 10.0, secs(2.0), false);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0 + secs(1.0));

        assert_eq!(scene.get(id).unwrap().position(), Vector3::splat(5.0));
        assert_eq!(animator.tracks()[0].state(), TrackState::Running);
        assert_eq!(animator.tracks()[0].elapsed(), secs(1.0));
    }

    #[test]
    fn finished_track_stops_and_no_longer_mutates() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Position, 0.0, 10.0, secs(2.0), false);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0 + secs(3.0));

        assert_eq!(scene.get(id).unwrap().position(), Vector3::splat(10.0));
        assert_eq!(animator.tracks()[0].state(), TrackState::Stopped);
        assert!(!animator.is_running());

        scene.get_mut(id).unwrap().set_position(Vector3::new(-1.0, -2.0, -3.0));
        animator.update_at(&mut scene, t0 + secs(4.0));

        assert_eq!(scene.get(id).unwrap().position(), Vector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn track_added_after_start_uses_existing_start_time() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.add_animation(AnimatedProperty::Position, 0.0, 10.0, secs(2.0), false);
        assert!(animator.is_running());

        animator.update_at(&mut scene, t0 + secs(1.0));

        assert_eq!(scene.get(id).unwrap().position(), Vector3::splat(5.0));
        assert_eq!(animator.tracks()[0].state(), TrackState::Running);
    }

    #[test]
    fn track_added_after_stop_waits_for_restart() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.stop();
        animator.add_animation(AnimatedProperty::Scale, 1.0, 3.0, secs(1.0), false);
        animator.update_at(&mut scene, t0 + secs(0.5));

        assert_eq!(animator.tracks()[0].state(), TrackState::Idle);
        assert_eq!(scene.get(id).unwrap().scale(), Vector3::ONE);
    }

    #[test]
    fn updates_before_start_do_nothing() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Scale, 1.0, 4.0, secs(1.0), false);

        animator.update_at(&mut scene, Instant::now() + secs(0.5));

        assert_eq!(scene.get(id).unwrap().scale(), Vector3::ONE);
        assert_eq!(animator.tracks()[0].state(), TrackState::Idle);
    }

    #[test]
    fn looping_track_wraps_progress_and_keeps_running() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Scale, 0.0, 10.0, secs(1.0), true);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0 + Duration::from_millis(2250));

        assert_eq!(scene.get(id).unwrap().scale(), Vector3::splat(2.5));
        assert!(animator.is_running());
    }

    #[test]
    fn rotation_is_time_proportional_on_selected_axes() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_track(
            Track::new(AnimatedProperty::Rotation, 0.0, 4.0, secs(4.0))
                .looping(true)
                .axes(Axes::XY),
        );

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0 + secs(1.0));
        assert_eq!(scene.get(id).unwrap().rotation(), Vector3::new(1.0, 1.0, 0.0));

        // Sampling the same instant twice gives the same angle.
        animator.update_at(&mut scene, t0 + secs(1.0));
        assert_eq!(scene.get(id).unwrap().rotation(), Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn animated_values_rebuild_model_matrix() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Position, 0.0, 2.0, secs(1.0), false);

        let t0 = Instant::now();
        animator.start_at(t0);
        for ms in [100, 300, 600, 1000] {
            animator.update_at(&mut scene, t0 + Duration::from_millis(ms));
        }

        let mesh = scene.get(id).unwrap();
        assert_eq!(
            mesh.model_matrix().matrix(),
            glam::Mat4::from_translation(glam::Vec3::splat(2.0))
        );
    }

    #[test]
    fn eased_track_applies_curve() {
        let track = Track::new(AnimatedProperty::Scale, 0.0, 8.0, secs(2.0)).easing(Easing::EaseIn);
        assert_eq!(track.value_at(secs(1.0)), 2.0);
        assert_eq!(track.value_at(secs(5.0)), 8.0);
    }

    #[test]
    fn restart_rewinds_stopped_tracks() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Position, 0.0, 10.0, secs(1.0), false);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0 + secs(2.0));
        assert!(!animator.is_running());

        let t1 = t0 + secs(10.0);
        animator.start_at(t1);
        assert_eq!(animator.tracks()[0].state(), TrackState::Running);

        animator.update_at(&mut scene, t1 + Duration::from_millis(250));
        assert_eq!(scene.get(id).unwrap().position(), Vector3::splat(2.5));
    }

    #[test]
    fn zero_duration_track_snaps_to_end() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Scale, 1.0, 3.0, Duration::ZERO, true);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.update_at(&mut scene, t0);

        assert_eq!(scene.get(id).unwrap().scale(), Vector3::splat(3.0));
        assert_eq!(animator.tracks()[0].state(), TrackState::Stopped);
    }

    #[test]
    fn stop_halts_running_tracks() {
        let (mut scene, id) = scene_with_cube();
        let mut animator = Animator::new(id);
        animator.add_animation(AnimatedProperty::Position, 0.0, 1.0, secs(1.0), true);

        let t0 = Instant::now();
        animator.start_at(t0);
        animator.stop();
        animator.update_at(&mut scene, t0 + Duration::from_millis(500));

        assert_eq!(scene.get(id).unwrap().position(), Vector3::ZERO);
        assert_eq!(animator.tracks()[0].state(), TrackState::Stopped);
    }

    #[test]
    fn missing_target_is_ignored() {
        let (mut scene, _) = scene_with_cube();
        let mut animator = Animator::new(MeshId(7));
        animator.add_animation(AnimatedProperty::Position, 0.0, 1.0, secs(1.0), false);

        animator.start();
        animator.update(&mut scene);

        assert_eq!(scene.get(MeshId(0)).unwrap().position(), Vector3::ZERO);
    }
}
