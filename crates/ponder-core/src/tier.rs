//! Cognitive tier catalog.
//!
//! Five processing tiers with increasing depth and cost:
//! REFLEX (~150 tokens, <200ms) up to COMPREHENSIVE (~4000 tokens, <10s).
//! Lower tiers are faster but shallower; higher tiers slower but thorough.

use serde::{Deserialize, Serialize};

/// Cognitive processing tiers, ordered by depth.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveTier {
    Reflex = 0,
    Reactive = 1,
    Deliberate = 2,
    Analytical = 3,
    Comprehensive = 4,
}

impl CognitiveTier {
    pub const ALL: [CognitiveTier; 5] = [
        CognitiveTier::Reflex,
        CognitiveTier::Reactive,
        CognitiveTier::Deliberate,
        CognitiveTier::Analytical,
        CognitiveTier::Comprehensive,
    ];

    /// Numeric rank, REFLEX = 0 through COMPREHENSIVE = 4.
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CognitiveTier::Reflex => "REFLEX",
            CognitiveTier::Reactive => "REACTIVE",
            CognitiveTier::Deliberate => "DELIBERATE",
            CognitiveTier::Analytical => "ANALYTICAL",
            CognitiveTier::Comprehensive => "COMPREHENSIVE",
        }
    }
}

impl std::fmt::Display for CognitiveTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Memory access level granted to a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAccess {
    /// In-memory cache only (fastest)
    Cached,
    /// Recent conversation + cache
    Recent,
    /// Keyword-indexed search
    Indexed,
    /// Full memory search
    FullSearch,
}

/// Depth of context included in a tier's prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDepth {
    Minimal,
    Shallow,
    Standard,
    Deep,
    Full,
}

/// Expected response shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// 1-2 sentences
    Brief,
    /// A paragraph
    Moderate,
    /// Multiple structured paragraphs
    Thorough,
}

/// Full configuration for one cognitive tier. Fixed at build time.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TierConfig {
    pub tier: CognitiveTier,
    pub max_tokens: u32,
    pub target_latency_ms: u64,
    pub memory_access: MemoryAccess,
    pub context_depth: ContextDepth,
    pub can_interrupt: bool,
    pub runs_parallel: bool,
    pub max_context_tokens: u32,
    pub response_format: ResponseFormat,
    /// Router deadline for this tier. Floored at 1.5x the target latency.
    pub timeout_ms: u64,
}

static TIER_CONFIGS: [TierConfig; 5] = [
    TierConfig {
        tier: CognitiveTier::Reflex,
        max_tokens: 150,
        target_latency_ms: 200,
        memory_access: MemoryAccess::Cached,
        context_depth: ContextDepth::Minimal,
        can_interrupt: false,
        runs_parallel: true,
        max_context_tokens: 100,
        response_format: ResponseFormat::Brief,
        timeout_ms: 500,
    },
    TierConfig {
        tier: CognitiveTier::Reactive,
        max_tokens: 400,
        target_latency_ms: 500,
        memory_access: MemoryAccess::Recent,
        context_depth: ContextDepth::Shallow,
        can_interrupt: true,
        runs_parallel: true,
        max_context_tokens: 300,
        response_format: ResponseFormat::Brief,
        timeout_ms: 1000,
    },
    TierConfig {
        tier: CognitiveTier::Deliberate,
        max_tokens: 1200,
        target_latency_ms: 2000,
        memory_access: MemoryAccess::Indexed,
        context_depth: ContextDepth::Standard,
        can_interrupt: true,
        runs_parallel: false,
        max_context_tokens: 600,
        response_format: ResponseFormat::Moderate,
        timeout_ms: 3000,
    },
    TierConfig {
        tier: CognitiveTier::Analytical,
        max_tokens: 2500,
        target_latency_ms: 5000,
        memory_access: MemoryAccess::FullSearch,
        context_depth: ContextDepth::Deep,
        can_interrupt: true,
        runs_parallel: false,
        max_context_tokens: 1000,
        response_format: ResponseFormat::Thorough,
        timeout_ms: 7000,
    },
    TierConfig {
        tier: CognitiveTier::Comprehensive,
        max_tokens: 4000,
        target_latency_ms: 10000,
        memory_access: MemoryAccess::FullSearch,
        context_depth: ContextDepth::Full,
        can_interrupt: true,
        runs_parallel: false,
        max_context_tokens: 1500,
        response_format: ResponseFormat::Thorough,
        timeout_ms: 12000,
    },
];

/// Get the static configuration for a cognitive tier.
pub fn tier_config(tier: CognitiveTier) -> &'static TierConfig {
    &TIER_CONFIGS[tier as usize]
}
