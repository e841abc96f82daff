use alg;
use config;
use entity;
use graphics;
use render;
use scene;
use components::camera::Camera;

const MIN_FOV: f64 = 10.0; // Degrees
const MAX_FOV: f64 = 170.0;
const MIN_NEAR: f64 = 0.01;
const MAX_FAR: f64 = 500.0;
const MIN_DEPTH: f64 = 0.1; // Minimum gap between near and far planes

/// One line of the hierarchy panel
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyRow {
    pub handle: entity::Handle,
    pub name: String,
    pub depth: usize,
    pub selected: bool,
    pub leaf: bool,
}

/// Editor session: the scene, its viewing camera and the current selection
pub struct Editor {
    pub scene: scene::Scene,
    pub camera: Camera,
    pub color: graphics::Color,
    pub clear_color: graphics::Color,
    selected: Option<entity::Handle>,
}

impl Editor {
    pub fn new(settings: &config::Settings) -> Editor {
        let mut scene = scene::Scene::default();
        scene.add_root("Root");

        let mut editor = Editor {
            scene,
            camera: Camera::default(),
            color: settings.render.color,
            clear_color: settings.render.clear,
            selected: None,
        };

        // Same limits as the camera panel; far first so near is bounded by it
        editor.set_camera_position(settings.camera.position);
        editor.set_fov_degrees(settings.camera.fov);
        editor.set_far_plane(settings.camera.far);
        editor.set_near_plane(settings.camera.near);
        editor.resize(settings.window.width, settings.window.height);

        let camera = &editor.camera;

        if camera.near_plane != settings.camera.near
            || camera.far_plane != settings.camera.far
            || (editor.fov_degrees() - settings.camera.fov).abs() > 1e-9
        {
            warn!(
                "camera settings out of range (fov {}, near {}, far {}); \
                using fov {}, near {}, far {}",
                settings.camera.fov,
                settings.camera.near,
                settings.camera.far,
                editor.fov_degrees(),
                camera.near_plane,
                camera.far_plane,
            );
        }

        info!(
            "editor ready: camera at {}, {}x{}",
            camera.transform.position,
            settings.window.width,
            settings.window.height,
        );

        editor
    }

    /// A handle that no longer exists counts as no selection
    pub fn select(&mut self, handle: Option<entity::Handle>) {
        self.selected = handle.filter(|handle| self.scene.contains(*handle));
    }

    pub fn selected(&self) -> Option<entity::Handle> {
        self.selected.filter(|handle| self.scene.contains(*handle))
    }

    pub fn selected_node(&self) -> Option<&scene::Node> {
        self.selected().and_then(|handle| self.scene.get(handle))
    }

    pub fn add_object_to_root(&mut self) -> entity::Handle {
        self.scene.add_root("GameObject")
    }

    pub fn add_child_to_selected(&mut self) -> Option<entity::Handle> {
        let parent = self.selected()?;
        self.scene.spawn_child(parent, "Child").ok()
    }

    /// Returns the number of nodes removed
    pub fn remove_selected(&mut self) -> usize {
        let removed = match self.selected() {
            Some(handle) => self.scene.remove(handle).unwrap_or(0),
            None => 0,
        };

        self.selected = None;
        removed
    }

    pub fn set_selected_position(&mut self, position: alg::Vec3) -> bool {
        self.edit_selected(|node| node.transform.position = position)
    }

    /// Yaw, pitch, roll in radians
    pub fn set_selected_euler(&mut self, euler: alg::Vec3) -> bool {
        self.edit_selected(|node| node.transform.set_euler_rotation(euler))
    }

    pub fn set_selected_scale(&mut self, scale: alg::Vec3) -> bool {
        self.edit_selected(|node| node.transform.scale = scale)
    }

    fn edit_selected<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut scene::Node),
    {
        let handle = match self.selected() {
            Some(handle) => handle,
            None => return false,
        };

        match self.scene.get_mut(handle) {
            Some(node) => {
                edit(node);
                true
            },
            None => false,
        }
    }

    pub fn fov_degrees(&self) -> f64 {
        self.camera.fov_horizontal.to_degrees()
    }

    pub fn set_fov_degrees(&mut self, degrees: f64) {
        self.camera.fov_horizontal = degrees.max(MIN_FOV).min(MAX_FOV).to_radians();
    }

    pub fn set_near_plane(&mut self, near: f64) {
        let upper = self.camera.far_plane - MIN_DEPTH;
        self.camera.near_plane = near.min(upper).max(MIN_NEAR);
    }

    pub fn set_far_plane(&mut self, far: f64) {
        let lower = self.camera.near_plane + MIN_DEPTH;
        self.camera.far_plane = far.max(lower).min(MAX_FAR);
    }

    pub fn set_camera_position(&mut self, position: alg::Vec3) {
        self.camera.transform.position = position;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_from_size(width, height);
    }

    pub fn hierarchy(&self) -> Vec<HierarchyRow> {
        let selected = self.selected();

        self.scene.depth_first()
            .map(|(handle, node, depth)| HierarchyRow {
                handle,
                name: node.name.clone(),
                depth,
                selected: selected == Some(handle),
                leaf: node.children().is_empty(),
            }).collect()
    }

    pub fn draw<T: render::Target>(
        &self,
        target: &mut T,
    ) -> Result<usize, alg::AffineError> {
        target.clear(self.clear_color);
        render::draw_scene(&self.scene, &self.camera, self.color, target)
    }
}

#[cfg(test)]
mod tests {
    use alg;
    use config;
    use graphics;
    use render;
    use editor::*;

    const EPSILON: f64 = 1e-9;

    fn editor() -> Editor {
        Editor::new(&config::Settings::default())
    }

    #[test]
    fn starts_with_root() {
        let editor = editor();

        let rows = editor.hierarchy();
        assert!(rows.len() == 1);
        assert!(rows[0].name == "Root" && rows[0].depth == 0 && rows[0].leaf);
        assert!(editor.selected().is_none());

        assert!(editor.camera.transform.position == alg::Vec3::new(0., 2., 6.));
        assert!((editor.camera.aspect_ratio - 1280. / 720.).abs() < EPSILON);
        assert!((editor.fov_degrees() - 90.).abs() < EPSILON);
    }

    #[test]
    fn add_nodes() {
        let mut editor = editor();

        assert!(editor.add_child_to_selected().is_none());

        let object = editor.add_object_to_root();
        editor.select(Some(object));

        let child = editor.add_child_to_selected().unwrap();

        let rows = editor.hierarchy();
        let names = rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();

        assert!(names == vec!["Root", "GameObject", "Child"]);
        assert!(rows[1].selected && !rows[1].leaf);
        assert!(rows[2].handle == child && rows[2].depth == 1 && rows[2].leaf);
    }

    #[test]
    fn inspector_edits() {
        let mut editor = editor();

        assert!(!editor.set_selected_position(alg::Vec3::one()));

        let root = editor.scene.roots()[0];
        editor.select(Some(root));

        let euler = alg::Vec3::new(0.2, 0.3, -0.1);

        assert!(editor.set_selected_position(alg::Vec3::new(1., 2., 3.)));
        assert!(editor.set_selected_euler(euler));
        assert!(editor.set_selected_scale(alg::Vec3::new(2., 2., 2.)));

        let transform = editor.selected_node().unwrap().transform;

        assert!(transform.position == alg::Vec3::new(1., 2., 3.));
        assert!(transform.euler_rotation() == euler);
        assert!(transform.scale == alg::Vec3::new(2., 2., 2.));
    }

    #[test]
    fn remove_clears_selection() {
        let mut editor = editor();

        let object = editor.add_object_to_root();
        editor.select(Some(object));
        editor.add_child_to_selected().unwrap();

        assert!(editor.remove_selected() == 2);
        assert!(editor.selected().is_none());
        assert!(editor.scene.count() == 1);
        assert!(editor.remove_selected() == 0);
    }

    #[test]
    fn stale_selection() {
        let mut editor = editor();

        let object = editor.add_object_to_root();
        editor.select(Some(object));

        // Removed behind the editor's back
        editor.scene.remove(object).unwrap();

        assert!(editor.selected().is_none());
        assert!(editor.selected_node().is_none());
        assert!(!editor.set_selected_scale(alg::Vec3::one()));

        editor.select(Some(object));
        assert!(editor.selected().is_none());
    }

    #[test]
    fn camera_clamps() {
        let mut editor = editor();

        editor.set_fov_degrees(200.);
        assert!((editor.fov_degrees() - 170.).abs() < EPSILON);

        editor.set_fov_degrees(1.);
        assert!((editor.fov_degrees() - 10.).abs() < EPSILON);

        editor.set_near_plane(0.);
        assert!(editor.camera.near_plane == 0.01);

        editor.set_near_plane(1000.);
        assert!((editor.camera.near_plane - 99.9).abs() < EPSILON);

        editor.set_far_plane(1.);
        assert!((editor.camera.far_plane - 100.).abs() < EPSILON);

        editor.set_far_plane(1000.);
        assert!(editor.camera.far_plane == 500.);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut editor = editor();

        editor.resize(1000, 500);
        assert!((editor.camera.aspect_ratio - 2.).abs() < EPSILON);

        editor.resize(1000, 0);
        assert!((editor.camera.aspect_ratio - 2.).abs() < EPSILON);
    }

    #[test]
    fn settings_out_of_range() {
        let mut settings = config::Settings::default();
        settings.camera.fov = 200.;
        settings.camera.near = 50.;
        settings.camera.far = 10.;

        let editor = Editor::new(&settings);
        let camera = &editor.camera;

        assert!((editor.fov_degrees() - 170.).abs() < EPSILON);
        assert!(camera.far_plane == 10.);
        assert!((camera.near_plane - 9.9).abs() < EPSILON);
        assert!(camera.near_plane < camera.far_plane);

        // Projection keeps its orientation and depth direction
        let projection = camera.projection_matrix();
        assert!(projection.at(0, 0) > 0.);
        assert!(projection.at(2, 2) < 0.);

        settings.camera.fov = 0.;
        settings.camera.near = -1.;
        settings.camera.far = 1000.;

        let editor = Editor::new(&settings);

        assert!((editor.fov_degrees() - 10.).abs() < EPSILON);
        assert!(editor.camera.near_plane == 0.01);
        assert!(editor.camera.far_plane == 500.);
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl render::Target for Recorder {
        fn clear(&mut self, color: graphics::Color) {
            self.calls.push(format!("clear {}", color));
        }

        fn upload_mvp(&mut self, _: &alg::Mat, _: &alg::Mat, _: &alg::Mat) {
            self.calls.push("mvp".to_string());
        }

        fn upload_color(&mut self, color: graphics::Color) {
            self.calls.push(format!("color {}", color));
        }

        fn draw(&mut self) {
            self.calls.push("draw".to_string());
        }
    }

    #[test]
    fn draw_clears_first() {
        let mut editor = editor();
        editor.add_object_to_root();

        let mut target = Recorder::default();
        assert!(editor.draw(&mut target).unwrap() == 2);

        let clear = format!("clear {}", graphics::Color::slate());
        let color = format!("color {}", graphics::Color::amber());

        assert!(target.calls[0] == clear);
        assert!(target.calls.iter().filter(|call| **call == clear).count() == 1);
        assert!(target.calls[1..] == [
            "mvp".to_string(), color.clone(), "draw".to_string(),
            "mvp".to_string(), color, "draw".to_string(),
        ]);
    }
}
