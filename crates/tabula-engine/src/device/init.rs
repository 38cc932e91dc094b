use crate::shader::Dialect;

/// Initialization parameters for the engine.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shader dialect and GL profile the host created its context for.
    ///
    /// Resolved once at init into fixed shader sources and format enums.
    pub dialect: Dialect,

    /// Link the two-color mask program.
    ///
    /// When disabled, `draw_mask` reports `RenderError::MaskUnavailable`.
    pub enable_mask: bool,

    /// Poll `glGetError` after state-changing calls and log anything found.
    ///
    /// Diagnostic only; never alters control flow.
    pub check_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::native(),
            enable_mask: true,
            check_errors: cfg!(debug_assertions),
        }
    }
}
