/// Terminal front-end: ASCII rendering with mouse-driven pan and rotate
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton as TermButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use orbitpan_core::{
    ManipulationState, ManipulatorConfig, Mesh, MouseButton, PointerHandler, Viewport, Workbench,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::info;

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

/// Terminal row of the first rendered row; the status line sits above it.
const VIEW_TOP: u16 = 1;

/// Map a crossterm button onto DOM-style button ids.
pub fn button_id(button: TermButton) -> MouseButton {
    match button {
        TermButton::Left => MouseButton::Primary,
        TermButton::Middle => MouseButton::Auxiliary,
        TermButton::Right => MouseButton::Secondary,
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    workbench: Workbench,
    renderer: AsciiRenderer,
    frame_time: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: ManipulatorConfig, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(mesh, config, target_fps, width, height))
    }

    pub fn with_size(
        mesh: Mesh,
        config: ManipulatorConfig,
        target_fps: u32,
        width: u16,
        height: u16,
    ) -> Self {
        let viewport = Viewport::new(f32::from(width), f32::from(height));
        let mut app = Self {
            workbench: Workbench::demo(mesh, viewport, config),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            frame_time: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height);
        app
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain every pending event so drags stay responsive
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    info!("quit requested");
                    self.running = false;
                }
                KeyCode::Char('r') => self.workbench.reset(),
                _ => {}
            },
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        if let MouseEventKind::Up(button) = kind {
            self.workbench.on_release(button_id(button));
            return;
        }
        // The status line is not part of the viewport
        let Some(view_row) = row.checked_sub(VIEW_TOP) else {
            return;
        };
        // Sample cell centers
        let x = f32::from(column) + 0.5;
        let y = f32::from(view_row) + 0.5;
        match kind {
            MouseEventKind::Down(button) => self.workbench.on_press(button_id(button), x, y),
            MouseEventKind::Drag(_) | MouseEventKind::Moved => self.workbench.on_move(x, y),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        // Keep one row for the status line
        let rows = height.saturating_sub(1).max(1);
        self.workbench.resize(f32::from(width), f32::from(rows));
        self.workbench.camera.aspect = f32::from(width) * CELL_ASPECT / f32::from(rows);
        self.renderer.resize(width as usize, rows as usize);
    }

    fn status(&self) -> &'static str {
        match self.workbench.state() {
            ManipulationState::Idle => "idle",
            ManipulationState::Panning { .. } => "panning",
            ManipulationState::Rotating => "rotating",
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_mesh(
            self.workbench.node.mesh(),
            &self.workbench.model_matrix(),
            &self.workbench.camera,
        );

        let mut stdout = stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "orbitpan | {:<8} | FPS: {:.1} | Left-drag=Pan Right-drag=Rotate R=Reset Q=Quit",
                self.status(),
                self.fps
            )),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            ResetColor
        )?;
        self.renderer.draw(&mut stdout, VIEW_TOP)?;

        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use orbitpan_core::{Target, Transform};

    fn app() -> TerminalApp {
        TerminalApp::with_size(Mesh::cube(1.0), ManipulatorConfig::default(), 30, 120, 41)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    /// Terminal cell under the object's center
    fn object_cell(app: &TerminalApp) -> (u16, u16) {
        let bench = app.workbench();
        let center = Transform::position(&bench.model_matrix());
        let (x, y, _) = bench.camera.project_to_screen(&center, &bench.viewport).unwrap();
        (x as u16, y as u16 + VIEW_TOP)
    }

    /// Lowest drawn cell of the object, in terminal coordinates
    fn bottom_edge_cell(app: &mut TerminalApp) -> (u16, u16) {
        app.renderer.clear();
        app.renderer.render_mesh(
            app.workbench.node.mesh(),
            &app.workbench.model_matrix(),
            &app.workbench.camera,
        );
        let (width, rows) = (app.workbench.viewport.width as usize, app.workbench.viewport.height as usize);
        (0..rows)
            .rev()
            .find_map(|y| {
                (0..width)
                    .find(|&x| app.renderer.cell(x, y) != Some(' '))
                    .map(|x| (x as u16, y as u16 + VIEW_TOP))
            })
            .unwrap()
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(button_id(TermButton::Left), MouseButton::Primary);
        assert_eq!(button_id(TermButton::Right), MouseButton::Secondary);
        assert_eq!(button_id(TermButton::Middle), MouseButton::Auxiliary);
    }

    #[test]
    fn test_resize_reserves_status_row() {
        let app = app();
        assert_eq!(app.workbench().viewport, Viewport::new(120.0, 40.0));
        assert!((app.workbench().camera.aspect - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_left_drag_pans() {
        let mut app = app();
        let (column, row) = object_cell(&app);
        let before = Transform::position(&app.workbench().model_matrix());

        app.handle_event(mouse(MouseEventKind::Down(TermButton::Left), column, row));
        assert_eq!(app.status(), "panning");
        app.handle_event(mouse(MouseEventKind::Drag(TermButton::Left), column + 4, row));
        app.handle_event(mouse(MouseEventKind::Up(TermButton::Left), column + 4, row));
        assert_eq!(app.status(), "idle");

        let after = Transform::position(&app.workbench().model_matrix());
        assert!(after.x > before.x);
    }

    #[test]
    fn test_right_drag_rotates_and_reset_restores() {
        let mut app = app();
        let (column, row) = object_cell(&app);
        let initial = app.workbench().node.local_to_parent();

        app.handle_event(mouse(MouseEventKind::Down(TermButton::Right), column, row));
        assert_eq!(app.status(), "rotating");
        app.handle_event(mouse(MouseEventKind::Drag(TermButton::Right), column + 2, row));
        app.handle_event(mouse(MouseEventKind::Up(TermButton::Right), column + 2, row));
        assert_ne!(app.workbench().node.local_to_parent(), initial);

        app.handle_event(key(KeyCode::Char('r')));
        assert_eq!(app.workbench().node.local_to_parent(), initial);
    }

    #[test]
    fn test_press_on_visible_bottom_edge_starts_pan() {
        let mut app = app();
        let (column, row) = bottom_edge_cell(&mut app);
        app.handle_event(mouse(MouseEventKind::Down(TermButton::Left), column, row));
        assert_eq!(app.status(), "panning");
    }

    #[test]
    fn test_status_row_is_not_pickable() {
        let mut app = app();
        let (column, _) = object_cell(&app);
        app.handle_event(mouse(MouseEventKind::Down(TermButton::Left), column, 0));
        assert_eq!(app.status(), "idle");
    }

    #[test]
    fn test_release_over_status_row_ends_gesture() {
        let mut app = app();
        let (column, row) = object_cell(&app);
        app.handle_event(mouse(MouseEventKind::Down(TermButton::Right), column, row));
        assert_eq!(app.status(), "rotating");
        app.handle_event(mouse(MouseEventKind::Up(TermButton::Right), column, 0));
        assert_eq!(app.status(), "idle");
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('q')));
        assert!(!app.is_running());
    }
}
