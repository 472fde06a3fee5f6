pub mod types;

pub use types::ShellWindowEvent;

pub fn translate_window_event(event: &winit::event::WindowEvent) -> Option<ShellWindowEvent> {
    use winit::event::WindowEvent;
    match event {
        WindowEvent::Resized(sz) => Some(ShellWindowEvent::Resized(*sz)),
        WindowEvent::CloseRequested => Some(ShellWindowEvent::CloseRequested),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::WindowEvent;

    #[test]
    fn translates_resize_and_close() {
        assert_eq!(
            translate_window_event(&WindowEvent::Resized(PhysicalSize::new(1000, 700))),
            Some(ShellWindowEvent::Resized(PhysicalSize::new(1000, 700)))
        );
        assert_eq!(
            translate_window_event(&WindowEvent::Moved(PhysicalPosition::new(-5, 12))),
            None
        );
        assert_eq!(
            translate_window_event(&WindowEvent::CloseRequested),
            Some(ShellWindowEvent::CloseRequested)
        );
        assert_eq!(translate_window_event(&WindowEvent::RedrawRequested), None);
    }
}
