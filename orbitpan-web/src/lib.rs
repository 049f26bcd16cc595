/// orbitpan web bindings
///
/// Wraps a `Workbench` for JavaScript: forward canvas mouse events in, read
/// the object's model matrix back out and draw it with any WebGL renderer.
use orbitpan_core::{
    obj, ManipulationState, ManipulatorConfig, Mesh, MouseButton, PointerHandler, Target, Viewport,
    Workbench,
};
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

#[wasm_bindgen]
pub struct WebManipulator {
    workbench: Workbench,
}

#[wasm_bindgen]
impl WebManipulator {
    /// Demo scene over a `width` x `height` canvas with a cube as the object.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebManipulator {
        WebManipulator {
            workbench: Workbench::demo(
                Mesh::cube(1.0),
                Viewport::new(width, height),
                ManipulatorConfig::default(),
            ),
        }
    }

    /// Replace the object's mesh with the parsed OBJ text.
    pub fn load_obj(&mut self, source: &str) -> Result<(), JsValue> {
        let mesh = obj::parse_obj(source).map_err(|err| JsValue::from_str(&err.to_string()))?;
        debug!(triangles = mesh.triangles.len(), "mesh replaced");
        self.workbench.node.set_mesh(mesh);
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.workbench.resize(width, height);
    }

    pub fn press(&mut self, button: i16, x: f32, y: f32) {
        self.workbench.on_press(MouseButton::from_id(button), x, y);
    }

    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.workbench.on_move(x, y);
    }

    pub fn release(&mut self, button: i16) {
        self.workbench.on_release(MouseButton::from_id(button));
    }

    /// `mousedown` listener body; `canvas` supplies the client-space offset.
    #[wasm_bindgen(js_name = onMouseDown)]
    pub fn on_mouse_down(&mut self, event: &MouseEvent, canvas: &Element) {
        let (x, y) = canvas_position(event, canvas);
        self.press(event.button(), x, y);
    }

    #[wasm_bindgen(js_name = onMouseMove)]
    pub fn on_mouse_move(&mut self, event: &MouseEvent, canvas: &Element) {
        let (x, y) = canvas_position(event, canvas);
        self.move_to(x, y);
    }

    #[wasm_bindgen(js_name = onMouseUp)]
    pub fn on_mouse_up(&mut self, event: &MouseEvent) {
        self.release(event.button());
    }

    pub fn reset(&mut self) {
        self.workbench.reset();
    }

    /// "idle", "panning" or "rotating"
    pub fn state(&self) -> String {
        match self.workbench.state() {
            ManipulationState::Idle => "idle",
            ManipulationState::Panning { .. } => "panning",
            ManipulationState::Rotating => "rotating",
        }
        .to_string()
    }

    /// Column-major local-to-world matrix of the object
    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self) -> Vec<f32> {
        self.workbench.node.local_to_world().as_slice().to_vec()
    }

    /// Column-major projection * view matrix of the camera
    #[wasm_bindgen(js_name = viewProjection)]
    pub fn view_projection(&self) -> Vec<f32> {
        self.workbench.camera.view_projection().as_slice().to_vec()
    }

    /// Flat `[x, y, z, nx, ny, nz, ...]` vertex buffer of the mesh, three
    /// vertices per triangle
    #[wasm_bindgen(js_name = vertexBuffer)]
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.workbench
            .node
            .mesh()
            .triangles
            .iter()
            .flat_map(|triangle| triangle.vertices.iter())
            .flat_map(|vertex| {
                let (p, n) = (vertex.position, vertex.normal);
                [p.x, p.y, p.z, n.x, n.y, n.z]
            })
            .collect()
    }
}

fn canvas_position(event: &MouseEvent, canvas: &Element) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        (f64::from(event.client_x()) - rect.left()) as f32,
        (f64::from(event.client_y()) - rect.top()) as f32,
    )
}
