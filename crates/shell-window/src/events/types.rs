use winit::dpi::PhysicalSize;

/// Window events the shell reacts to on secondary windows.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellWindowEvent {
    Resized(PhysicalSize<u32>),
    CloseRequested,
}
