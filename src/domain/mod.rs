// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the system: addition problems, their digit encoding,
// dataset splits, and the traits other layers implement.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Addition problems, encoded sequences, training pairs, splits
pub mod problem;

// Core abstractions (traits) that other layers implement
pub mod traits;
