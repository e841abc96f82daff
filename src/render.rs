use alg;
use graphics;
use scene;
use components::camera::Camera;

/// Receives per-node draw state. Implemented by the GPU backend
pub trait Target {
    /// Called once per frame, before any node is drawn
    fn clear(&mut self, color: graphics::Color);
    fn upload_mvp(&mut self, model: &alg::Mat, view: &alg::Mat, projection: &alg::Mat);
    fn upload_color(&mut self, color: graphics::Color);
    fn draw(&mut self);
}

/// Draws every node reachable from the roots, parents before children. \
/// Returns the number of draw calls issued.
pub fn draw_scene<T: Target>(
    scene:  &scene::Scene,
    camera: &Camera,
    color:  graphics::Color,
    target: &mut T,
) -> Result<usize, alg::AffineError> {
    let view = camera.view_matrix()?;
    let projection = camera.projection_matrix();

    // Global matrix of each ancestor on the current path
    let mut path: Vec<alg::Mat> = Vec::new();
    let mut draws = 0;

    for (_, node, depth) in scene.depth_first() {
        path.truncate(depth);

        let global = match path.last() {
            Some(parent) => *parent * node.transform.local_matrix(),
            None => node.transform.local_matrix(),
        };

        target.upload_mvp(&global, &view, &projection);
        target.upload_color(color);
        target.draw();

        path.push(global);
        draws += 1;
    }

    trace!("drew {} nodes", draws);

    Ok(draws)
}
