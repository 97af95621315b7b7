/// Data layer: core types, loading, typing, splitting and counting.
///
/// Architecture:
/// ```text
///   .arff text
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  strict arff parse, else line-based fallback → Table
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │  numeric columns → Integer / Float cells
///   └───────────┘
///        │
///        ├────────────────┐
///        ▼                ▼
///   ┌──────────┐    ┌───────────┐
///   │  split    │    │ histogram │  label → count per subset
///   └──────────┘    └───────────┘
///    train / validation / test
/// ```

pub mod arff;
pub mod histogram;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod split;
