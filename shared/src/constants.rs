/// Length of one fixed simulation frame in milliseconds (30 Hz).
pub const FIXED_STEP_MS: f32 = 1000.0 / 30.0;

/// Constant traversal speed along a line, in world units per second.
pub const PATH_FOLLOW_MAX_SPEED: f32 = 1000.0;

/// Planar walking speed in world units per second.
pub const WALK_SPEED: f32 = 600.0;

/// Air-control multiplier for planar movement while airborne.
///
/// Convention:
/// - 1.0 = full ground control in air (arcade / very floaty)
/// - 0.0 = no air control
///
/// Typical values: 0.1 .. 0.4
pub const AIR_CONTROL_MULTIPLIER: f32 = 0.4;

/// How quickly airborne planar velocity converges on the requested velocity (1/s).
pub const AIR_CONTROL_RESPONSE: f32 = 4.0;

/// Gravity magnitude in units per second squared (positive value).
pub const GRAVITY: f32 = 980.0;

/// Terminal fall speed (negative, downward).
pub const TERMINAL_FALL_SPEED: f32 = -4000.0;

/// Upward launch speed applied by the jump transition.
pub const JUMP_SPEED: f32 = 500.0;

/// Upward speed added when letting go of a line.
pub const PATH_FOLLOW_EXIT_UP_SPEED: f32 = 300.0;

/// Fraction of the traversal speed kept along the facing direction when letting go of a line.
pub const PATH_FOLLOW_EXIT_CARRY: f32 = 0.25;

/// Very slight downward speed applied while walking to keep contact on slopes.
pub const GROUND_BIAS_SPEED: f32 = -12.5;

/// Practical small distance for "is nearly zero" comparisons (world units).
pub const NEARLY_ZERO: f32 = 1.0e-4;

/// Minimum squared planar length required to derive a facing direction.
pub const YAW_EPS: f32 = 1.0e-6;

/// Minimum move input magnitude that counts as an affirmative move request.
pub const MOVE_INPUT_EPS: f32 = 1.0e-3;
