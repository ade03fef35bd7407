use std::collections::HashMap;

/// Identifies one animation across the whole map. Two tilesets may both have
/// an animation 0; the tileset index keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationKey {
    /// Index into [`MapRenderData::tilesets`](crate::MapRenderData::tilesets).
    pub tileset: u32,
    /// Index into that tileset's animations.
    pub animation: u32,
}

impl AnimationKey {
    /// Key for animation `animation` of tileset `tileset`.
    #[inline]
    pub fn new(tileset: u32, animation: u32) -> Self {
        Self { tileset, animation }
    }
}

/// Playback clock of one animation, shared by every tile showing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    /// Total time played. Never wrapped here; readers take it modulo the
    /// animation length.
    pub elapsed_ms: u64,
}

/// Lazily populated map of animation clocks.
#[derive(Debug, Default)]
pub struct AnimationStates {
    states: HashMap<AnimationKey, AnimationState>,
}

impl AnimationStates {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every tracked clock by `delta_ms`.
    pub fn advance_all(&mut self, delta_ms: u32) {
        for state in self.states.values_mut() {
            state.elapsed_ms = state.elapsed_ms.saturating_add(u64::from(delta_ms));
        }
    }

    /// State for `key`, created at zero on first access.
    pub fn get_or_create(&mut self, key: AnimationKey) -> &mut AnimationState {
        self.states.entry(key).or_default()
    }

    /// State for `key`, if it was ever drawn.
    pub fn get(&self, key: AnimationKey) -> Option<&AnimationState> {
        self.states.get(&key)
    }

    /// Forgets every clock. Animations restart at frame 0 when next drawn.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// Number of clocks created so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True before any animated tile has been drawn.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
