extern crate mini_scene;
#[macro_use] extern crate log;

use mini_scene::{alg, config, editor, graphics, logging, render};

/// Stands in for the GPU backend: logs what would be uploaded
struct LogTarget {
    frame: usize,
}

impl render::Target for LogTarget {
    fn clear(&mut self, color: graphics::Color) {
        debug!("frame {} clear {}", self.frame, color);
    }

    fn upload_mvp(&mut self, model: &alg::Mat, view: &alg::Mat, projection: &alg::Mat) {
        let mvp = *projection * *view * *model;
        debug!("frame {} mvp:\n{}", self.frame, mvp);
    }

    fn upload_color(&mut self, color: graphics::Color) {
        trace!("color {}", color);
    }

    fn draw(&mut self) {
        trace!("draw");
    }
}

fn main() {
    let settings = &*config::ENGINE_CONFIG;
    logging::init(settings.log_level);

    if let Some(err) = config::load_error() {
        warn!("{}; using default settings", err);
    }

    info!("{} ({}x{})", settings.window.title, settings.window.width, settings.window.height);

    let mut editor = editor::Editor::new(settings);

    // Default demo hierarchy
    let object = editor.add_object_to_root();
    editor.select(Some(object));
    editor.set_selected_position(alg::Vec3::new(2., 0., 0.));
    editor.set_selected_euler(alg::Vec3::new(45f64.to_radians(), 0., 0.));

    if let Some(child) = editor.add_child_to_selected() {
        editor.select(Some(child));
        editor.set_selected_position(alg::Vec3::new(0., 1.5, 0.));
        editor.set_selected_scale(alg::Vec3::new(0.5, 0.5, 0.5));
    }

    for row in editor.hierarchy() {
        info!(
            "{}{} {}{}",
            "  ".repeat(row.depth),
            row.handle,
            row.name,
            if row.selected { " *" } else { "" },
        );
    }

    let mut target = LogTarget { frame: 0 };

    match editor.draw(&mut target) {
        Ok(draws) => info!("frame {}: {} draws", target.frame, draws),
        Err(err) => error!("frame {} failed: {}", target.frame, err),
    }
}
