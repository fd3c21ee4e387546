/// Router Module Index
///
/// Routes are split into three tiers by who may reach them. `create_router`
/// wraps each tier in the access gate with the matching `AccessRequirement`,
/// so a handler never runs for a session the gate would deny.

/// Open to every viewer, signed in or not.
pub mod public;

/// Requires a resolved, signed-in viewer.
pub mod authenticated;

/// Requires a signed-in viewer holding the 'admin' role.
pub mod admin;
