use winit::dpi::LogicalSize;

/// Window/host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Redraw every loop iteration instead of only on demand.
    pub continuous_redraw: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "texquad".to_string(),
            initial_size: LogicalSize::new(513.0, 912.0),
            continuous_redraw: true,
        }
    }
}
