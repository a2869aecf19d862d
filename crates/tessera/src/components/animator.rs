//! Frame-based sprite animation state.
//!
//! An [`Animator`] holds named clips, each a list of source rects into the
//! sprite's texture, and which clip is playing. The
//! [`AnimationSystem`](crate::systems::AnimationSystem) turns elapsed time into
//! a frame and writes it to the entity's [`Sprite`](super::Sprite).

use std::collections::HashMap;
use std::time::Duration;

use crate::logger::{self, Severity};
use crate::math::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    /// How long each frame is shown.
    frame_time: Duration,
    clips: HashMap<String, Vec<Rect>>,
    current: Option<String>,
}

impl Animator {
    pub fn new(frame_time: Duration) -> Self {
        Self {
            frame_time,
            clips: HashMap::new(),
            current: None,
        }
    }

    /// Add (or replace) a clip. The first clip added starts playing.
    pub fn add_clip(&mut self, name: &str, frames: Vec<Rect>) -> &mut Self {
        self.clips.insert(name.to_string(), frames);
        if self.current.is_none() {
            self.current = Some(name.to_string());
        }
        self
    }

    /// Switch to the clip `name`. Unknown names are reported and ignored.
    pub fn play(&mut self, name: &str) {
        if self.current.as_deref() == Some(name) {
            return;
        }
        if self.clips.contains_key(name) {
            self.current = Some(name.to_string());
        } else {
            logger::warning(format!("Animation `{name}` does not exist"), Severity::Low);
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// The frame of the current clip at `elapsed`, looping.
    pub fn frame_at(&self, elapsed: Duration) -> Option<Rect> {
        let frames = self.clips.get(self.current.as_deref()?)?;
        if frames.is_empty() {
            return None;
        }
        let step = self.frame_time.as_nanos().max(1);
        let index = (elapsed.as_nanos() / step) as usize % frames.len();
        Some(frames[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(y: f32) -> Vec<Rect> {
        (0..4).map(|i| Rect::new(i as f32 * 16.0, y, 16.0, 16.0)).collect()
    }

    #[test]
    fn first_clip_plays() {
        let mut animator = Animator::new(Duration::from_millis(100));
        animator.add_clip("idle", strip(0.0)).add_clip("walk", strip(16.0));
        assert_eq!(animator.current(), Some("idle"));
    }

    #[test]
    fn frames_loop_over_time() {
        let mut animator = Animator::new(Duration::from_millis(100));
        animator.add_clip("walk", strip(16.0));
        assert_eq!(animator.frame_at(Duration::from_millis(0)).unwrap().x, 0.0);
        assert_eq!(animator.frame_at(Duration::from_millis(250)).unwrap().x, 32.0);
        assert_eq!(animator.frame_at(Duration::from_millis(400)).unwrap().x, 0.0);
    }

    #[test]
    fn unknown_clip_is_ignored() {
        let mut animator = Animator::new(Duration::from_millis(100));
        animator.add_clip("idle", strip(0.0));
        animator.play("fly");
        assert_eq!(animator.current(), Some("idle"));
    }

    #[test]
    fn no_clip_no_frame() {
        let animator = Animator::new(Duration::from_millis(100));
        assert!(animator.frame_at(Duration::from_secs(1)).is_none());
    }
}
