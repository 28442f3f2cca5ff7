/// Data layer: core types, acquisition, and the exploration pipeline.
///
/// Architecture:
/// ```text
///  catalog API / .csv / .json / .parquet
///        │
///        ▼
///   ┌───────────────┐
///   │ source, loader │  fetch / parse → Table
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns of uniform inferred type
///   └──────────┘
///        │
///        ├──► roles   name heuristics → ColumnRoleMap
///        ├──► filter  role predicates → filtered row view
///        └──► chart   numeric axes + grouping → point sets
/// ```
pub mod chart;
pub mod filter;
pub mod loader;
pub mod model;
pub mod roles;
pub mod source;
