//! Storage offset assignment.
//!
//! Four counters drive the layout. Globals grow upward from zero and are
//! bumped before use, so the first global lands at one word. Locals grow
//! downward from the local base and are also bumped before use. Parameters
//! take the current counter and then move one word down, so the first
//! parameter sits at zero. Functions are numbered in discovery order.
//! The local and parameter counters reset each time a function is entered.

/// Word size and base offsets for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Bytes per storage slot.
    pub word_size: u32,
    /// Starting value of the local counter at each function entry.
    pub local_base: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            word_size: 4,
            local_base: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    config: LayoutConfig,
    global: i32,
    local: i32,
    parameter: i32,
    function: i32,
    in_function: bool,
}

impl StorageLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            global: 0,
            local: config.local_base,
            parameter: 0,
            function: 0,
            in_function: false,
        }
    }

    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    fn word(&self) -> i32 {
        i32::try_from(self.config.word_size).unwrap_or(i32::MAX)
    }

    /// Reset the per-function counters.
    pub fn enter_function(&mut self) {
        self.local = self.config.local_base;
        self.parameter = 0;
        self.in_function = true;
    }

    pub fn leave_function(&mut self) {
        self.in_function = false;
    }

    pub fn in_function(&self) -> bool {
        self.in_function
    }

    /// Offset for a variable. Arrays reserve one word per element.
    pub fn allocate_variable(&mut self, array_size: Option<u32>) -> i32 {
        let slots = array_size.map_or(1, |n| i32::try_from(n).unwrap_or(i32::MAX));
        let step = self.word().saturating_mul(slots);
        if self.in_function {
            self.local = self.local.saturating_sub(step);
            self.local
        } else {
            self.global = self.global.saturating_add(step);
            self.global
        }
    }

    /// Offset for the next parameter. Array parameters are passed by
    /// reference and take a single word.
    pub fn allocate_parameter(&mut self) -> i32 {
        let offset = self.parameter;
        self.parameter = self.parameter.saturating_sub(self.word());
        offset
    }

    /// Index for the next function.
    pub fn allocate_function(&mut self) -> i32 {
        let index = self.function;
        self.function += 1;
        index
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
