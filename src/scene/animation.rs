use glam::{Quat, Vec3, Vec4};

use super::model::{Model, Node};

/// Keyframe interpolation, as defined by glTF samplers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Each keyframe stores `[in_tangent, value, out_tangent]`
    CubicSpline,
}

/// Keyframe outputs of one channel
#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
    /// Flattened weights, one run of `targets` floats per output element
    Weights { values: Vec<f32>, targets: usize },
}

/// A channel value evaluated at one point in time
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
    Weights(Vec<f32>),
}

#[derive(Clone, Debug)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    /// Evaluates the channel at `time`, clamping outside the keyframe range
    pub fn sample(&self, time: f32) -> Option<Sample> {
        if self.times.is_empty() {
            return None;
        }

        let last = self.times.len() - 1;
        let (k0, k1, s, dt) = if time <= self.times[0] {
            (0, 0, 0.0, 0.0)
        } else if time >= self.times[last] {
            (last, last, 0.0, 0.0)
        } else {
            let next = self.times.partition_point(|&t| t <= time);
            let prev = next - 1;
            let dt = self.times[next] - self.times[prev];
            let s = if dt > 0.0 { (time - self.times[prev]) / dt } else { 0.0 };
            (prev, next, s, dt)
        };

        let sample = match &self.keyframes {
            Keyframes::Translation(values) => {
                Sample::Translation(self.interpolate_vec3(values, k0, k1, s, dt)?)
            }
            Keyframes::Scale(values) => Sample::Scale(self.interpolate_vec3(values, k0, k1, s, dt)?),
            Keyframes::Rotation(values) => Sample::Rotation(self.interpolate_quat(values, k0, k1, s, dt)?),
            Keyframes::Weights { values, targets } => {
                Sample::Weights(self.interpolate_weights(values, *targets, k0, k1, s, dt)?)
            }
        };

        Some(sample)
    }

    fn interpolate_vec3(&self, values: &[Vec3], k0: usize, k1: usize, s: f32, dt: f32) -> Option<Vec3> {
        match self.interpolation {
            Interpolation::Step => values.get(k0).copied(),
            Interpolation::Linear => Some(values.get(k0)?.lerp(*values.get(k1)?, s)),
            Interpolation::CubicSpline => {
                let v0 = *values.get(k0 * 3 + 1)?;
                let b0 = *values.get(k0 * 3 + 2)?;
                let v1 = *values.get(k1 * 3 + 1)?;
                let a1 = *values.get(k1 * 3)?;
                Some(hermite(v0, b0 * dt, v1, a1 * dt, s))
            }
        }
    }

    fn interpolate_quat(&self, values: &[Quat], k0: usize, k1: usize, s: f32, dt: f32) -> Option<Quat> {
        match self.interpolation {
            Interpolation::Step => values.get(k0).copied(),
            Interpolation::Linear => Some(values.get(k0)?.slerp(*values.get(k1)?, s)),
            Interpolation::CubicSpline => {
                let v0 = Vec4::from(*values.get(k0 * 3 + 1)?);
                let b0 = Vec4::from(*values.get(k0 * 3 + 2)?);
                let v1 = Vec4::from(*values.get(k1 * 3 + 1)?);
                let a1 = Vec4::from(*values.get(k1 * 3)?);
                let q = hermite(v0, b0 * dt, v1, a1 * dt, s);
                Some(Quat::from_vec4(q).normalize())
            }
        }
    }

    fn interpolate_weights(
        &self,
        values: &[f32],
        targets: usize,
        k0: usize,
        k1: usize,
        s: f32,
        dt: f32,
    ) -> Option<Vec<f32>> {
        if targets == 0 {
            return Some(Vec::new());
        }
        let element = |k: usize| values.get(k * targets..(k + 1) * targets);

        let weights = match self.interpolation {
            Interpolation::Step => element(k0)?.to_vec(),
            Interpolation::Linear => element(k0)?
                .iter()
                .zip(element(k1)?)
                .map(|(a, b)| a + (b - a) * s)
                .collect(),
            Interpolation::CubicSpline => {
                let v0 = element(k0 * 3 + 1)?;
                let b0 = element(k0 * 3 + 2)?;
                let v1 = element(k1 * 3 + 1)?;
                let a1 = element(k1 * 3)?;
                (0..targets)
                    .map(|i| hermite(v0[i], b0[i] * dt, v1[i], a1[i] * dt, s))
                    .collect()
            }
        };

        Some(weights)
    }
}

fn hermite<T>(v0: T, m0: T, v1: T, m1: T, s: f32) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    let s2 = s * s;
    let s3 = s2 * s;
    v0 * (2.0 * s3 - 3.0 * s2 + 1.0)
        + m0 * (s3 - 2.0 * s2 + s)
        + v1 * (-2.0 * s3 + 3.0 * s2)
        + m1 * (s3 - s2)
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Writes every channel's value at `time` into the target nodes
    pub fn apply(&self, time: f32, nodes: &mut [Node]) {
        for channel in &self.channels {
            let Some(node) = nodes.get_mut(channel.node) else {
                continue;
            };
            match channel.sample(time) {
                Some(Sample::Translation(t)) => node.transform.translation = t,
                Some(Sample::Rotation(r)) => node.transform.rotation = r,
                Some(Sample::Scale(s)) => node.transform.scale = s,
                Some(Sample::Weights(w)) => node.weights = w,
                None => {}
            }
        }
    }
}

/// Playback state of one clip
#[derive(Copy, Clone, Debug)]
pub struct ClipAction {
    pub clip: usize,
    pub time: f32,
    pub playing: bool,
}

/// Drives a single clip of the model it was created for
#[derive(Debug)]
pub struct AnimationMixer {
    action: ClipAction,
    duration: f32,
}

impl AnimationMixer {
    /// Creates a mixer for the model's first clip, or `None` when it has no clips
    pub fn for_model(model: &Model) -> Option<Self> {
        let clip = model.clips.first()?;
        Some(Self {
            action: ClipAction {
                clip: 0,
                time: 0.0,
                playing: false,
            },
            duration: clip.duration,
        })
    }

    pub fn play(&mut self, model: &mut Model) {
        self.action.playing = true;
        self.apply(model);
    }

    pub fn stop(&mut self) {
        self.action.playing = false;
        self.action.time = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.action.playing
    }

    pub fn action(&self) -> &ClipAction {
        &self.action
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Advances playback by `delta` seconds, looping at the clip duration
    pub fn update(&mut self, delta: f32, model: &mut Model) {
        if !self.action.playing {
            return;
        }

        self.action.time += delta.max(0.0);
        if self.duration > 0.0 {
            self.action.time = self.action.time.rem_euclid(self.duration);
        } else {
            self.action.time = 0.0;
        }

        self.apply(model);
    }

    fn apply(&self, model: &mut Model) {
        if let Some(clip) = model.clips.get(self.action.clip) {
            clip.apply(self.action.time, &mut model.nodes);
        }
    }
}
