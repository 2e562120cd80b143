// timeline.rs — 按时间排序的关键帧序列
//
// 相同时间的关键帧：后插入者优先（稳定排序 + 从尾部扫描）。

use crate::keyframe::Keyframe;

/// Neighbour indexes around a query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyframeIndexes {
    /// Last keyframe with `time <= query`.
    pub previous: Option<usize>,
    /// The keyframe after `previous`; `None` past the last keyframe.
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    keyframes: Vec<Keyframe>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { keyframes: Vec::new() }
    }

    /// Builds a sorted timeline. A sequence containing a malformed keyframe is
    /// rejected as a whole and the timeline starts empty.
    pub fn from_keyframes(keyframes: Vec<Keyframe>) -> Self {
        if let Some(bad) = keyframes.iter().find(|k| !k.is_valid()) {
            log::warn!("timeline rejected: keyframe with invalid time {}", bad.time());
            return Self::new();
        }

        let mut timeline = Self { keyframes };
        timeline.sort();
        timeline
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the last keyframe, or zero when empty.
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|k| k.time()).unwrap_or(0.0)
    }

    /// Inserts a keyframe and keeps the sequence sorted. Malformed keyframes
    /// are ignored.
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        if !keyframe.is_valid() {
            log::warn!("ignoring keyframe with invalid time {}", keyframe.time());
            return;
        }
        self.keyframes.push(keyframe);
        self.sort();
    }

    /// Drops every keyframe and its data.
    pub fn empty_keyframes(&mut self) {
        for keyframe in &mut self.keyframes {
            keyframe.release();
        }
        self.keyframes.clear();
    }

    pub fn get_keyframes_indexes(&self, time: f64) -> KeyframeIndexes {
        let len = self.keyframes.len();
        let previous = self.keyframes.iter().rposition(|k| k.time() <= time);

        let next = match previous {
            Some(i) if i + 1 < len => Some(i + 1),
            Some(_) => None,
            None if len > 0 => Some(0),
            None => None,
        };

        KeyframeIndexes { previous, next }
    }

    pub fn get_keyframes(&self, time: f64) -> (Option<&Keyframe>, Option<&Keyframe>) {
        let indexes = self.get_keyframes_indexes(time);
        (
            indexes.previous.and_then(|i| self.keyframes.get(i)),
            indexes.next.and_then(|i| self.keyframes.get(i)),
        )
    }

    /// Indexes one step beyond each neighbour, clamped to the sequence.
    pub fn get_side_keyframes_indexes(&self, time: f64) -> KeyframeIndexes {
        let indexes = self.get_keyframes_indexes(time);
        let last = self.keyframes.len().saturating_sub(1);

        KeyframeIndexes {
            previous: indexes.previous.map(|i| i.saturating_sub(1)),
            next: indexes.next.map(|i| (i + 1).min(last)),
        }
    }

    pub fn get_side_keyframes(&self, time: f64) -> (Option<&Keyframe>, Option<&Keyframe>) {
        let indexes = self.get_side_keyframes_indexes(time);
        (
            indexes.previous.and_then(|i| self.keyframes.get(i)),
            indexes.next.and_then(|i| self.keyframes.get(i)),
        )
    }

    fn sort(&mut self) {
        // sort_by 是稳定排序
        self.keyframes.sort_by(|a, b| a.time().total_cmp(&b.time()));
    }
}
