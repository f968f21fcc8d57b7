//! Mountjoy House
//!
//! Arrow keys rotate the house, D swings the front door open and shut, L sweeps the
//! light across the front, P pulses the roof color and A toggles the axis helper.
//!
//! Textures are read from `res/redbrick.jpg`, `res/yellowsandstone.jpg` and
//! `res/window.jpg` under the crate root. They are not shipped with the crate; without
//! them the demo exits at startup with a texture load error. Run with
//! `RUST_LOG=bothy=debug` to see texture uploads and animation progress.

use bothy::prelude::*;

const REDBRICK: &str = "res/redbrick.jpg";
const SANDSTONE: &str = "res/yellowsandstone.jpg";
const WINDOW: &str = "res/window.jpg";

const GLASS_GREY: [f32; 3] = [0.6, 0.6, 0.6];
const ROOF_COLOR: [f32; 3] = [0.0, 1.0, 1.0];
const ROOF_PULSE_COLOR: [f32; 3] = [1.0, 0.45, 0.1];

const ANIMATION_STEPS: u32 = 10;

/// Paneled window layer near the top of the building
fn glass_layer() -> Vec<ShapeBuilder> {
    let corner_width = 0.25;
    let d = 4.0 - corner_width / 2.0;
    let corner = |x: f32, z: f32| {
        ShapeBuilder::cube(&[x, 2.975, z], &[corner_width, 1.0, corner_width], &GLASS_GREY)
            .texture_uniform(WINDOW, 1.0)
    };
    let mut layer = vec![corner(d, d), corner(-d, d), corner(d, -d), corner(-d, -d)];

    let (x0, z0) = (-3.5, 3.875);
    for i in 0..15 {
        let x = x0 + 0.5 * i as f32;
        for quarter in 0..4 {
            layer.push(
                ShapeBuilder::cube(&[x, 2.975, z0], &[0.5, 1.0, 0.25], &GLASS_GREY)
                    .rotate(0.0, 90.0 * quarter as f32, 0.0)
                    .texture_uniform(WINDOW, 1.0),
            );
        }
    }
    layer
}

fn roof_layer() -> Vec<ShapeBuilder> {
    let (thickness, length) = (0.3, 10.55);
    let d = 5.0 + thickness / 2.0;
    let black = [0.0, 0.0, 0.0];
    let edge = |z: f32, turn: f32| {
        ShapeBuilder::cube(&[0.0, 3.555, z], &[length, 0.15, thickness], &black).rotate(0.0, turn, 0.0)
    };

    vec![
        ShapeBuilder::cube(&[0.0, 3.555, 0.0], &[10.0, 0.15, 10.0], &ROOF_COLOR).id("roof"),
        edge(d, 0.0),
        edge(-d, 0.0),
        edge(d, 90.0),
        edge(-d, 90.0),
    ]
}

/// Front door hung on a hinge at its left edge
fn front_door() -> ShapeBuilder {
    ShapeBuilder::pivot(&[-0.4, 1.05, 4.03]).id("door hinge").child(
        ShapeBuilder::cube(&[0.4, 0.0, 0.0], &[0.8, 1.3, 0.06], &[0.35, 0.2, 0.1]).id("door"),
    )
}

fn main_layers() -> Vec<ShapeBuilder> {
    let mut layers = vec![
        ShapeBuilder::cube(&[0.0, 0.375, 0.0], &[8.0, 0.35, 8.0], &[1.0, 0.8, 0.6]).texture(REDBRICK, 8.0, 0.4),
        ShapeBuilder::cube(&[0.0, 1.1, 0.0], &[8.0, 1.1, 8.0], &[1.0, 0.7, 0.7]).texture(SANDSTONE, 5.0, 1.2),
        ShapeBuilder::cube(&[0.0, 1.725, 0.0], &[8.0, 0.15, 8.0], &[0.6, 0.5, 0.5]).texture(SANDSTONE, 4.0, 0.2),
        ShapeBuilder::cube(&[0.0, 1.875, 0.0], &[8.0, 0.15, 8.0], &[1.0, 0.7, 0.7]).texture(SANDSTONE, 3.8, 0.2),
        ShapeBuilder::cube(&[0.0, 2.145, 0.0], &[8.0, 0.40, 8.0], &[1.0, 0.8, 0.6]).texture(REDBRICK, 8.0, 0.4),
        ShapeBuilder::cube(&[0.0, 2.4, 0.0], &[8.0, 0.15, 8.0], &[0.75, 0.75, 0.4]),
        front_door(),
    ];
    layers.extend(glass_layer());
    layers.extend(roof_layer());
    layers
}

fn mountjoy_house() -> Vec<ShapeBuilder> {
    vec![ShapeBuilder::cube(&[0.0, 0.0, 0.0], &[12.0, 0.35, 12.0], &[0.5, 0.5, 0.5])
        .id("root")
        .children(main_layers())]
}

fn blend(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t)
}

#[derive(Default)]
struct House {
    ids: IdTable,
}

impl House {
    /// Start an animation unless one is already playing
    fn animate<B, F>(animations: &mut AnimationController<Scene<B>>, mutator: F) -> Result<()>
    where
        B: GraphicsBackend + 'static,
        F: FnMut(&mut Scene<B>, StepDirection, u32) -> Result<()> + 'static,
    {
        match animations.run(1000, ANIMATION_STEPS, mutator, None) {
            Err(BothyError::AnimationBusy) => Ok(()),
            other => other,
        }
    }
}

impl<B: GraphicsBackend + 'static> SceneScript<B> for House {
    fn scene_config(&self) -> SceneConfig {
        SceneConfig::default()
            .with_camera_position(Vector3::new(0.0, 6.0, 30.0))
            .with_look_at(Vector3::new(0.0, 1.5, 0.0))
            .with_background_color([0.55, 0.7, 0.9])
    }

    fn textures(&self) -> Vec<String> {
        [REDBRICK, SANDSTONE, WINDOW].iter().map(|id| id.to_string()).collect()
    }

    fn build(&mut self, scene: &mut Scene<B>) -> Result<()> {
        let mut axis = AxisHelper::default();
        axis.visible = false;
        scene.add_axis(axis);
        self.ids = scene.add_built(mountjoy_house())?;
        log::info!("Built house with {} named nodes", self.ids.len());
        Ok(())
    }

    fn on_key(
        &mut self,
        key: KeyCode,
        scene: &mut Scene<B>,
        animations: &mut AnimationController<Scene<B>>,
    ) -> Result<()> {
        let angle = 10.0;
        match key {
            KeyCode::ArrowDown => scene.node_by_id_mut(&self.ids, "root")?.rotate(angle, 0.0, 0.0),
            KeyCode::ArrowUp => scene.node_by_id_mut(&self.ids, "root")?.rotate(-angle, 0.0, 0.0),
            KeyCode::ArrowRight => scene.node_by_id_mut(&self.ids, "root")?.rotate(0.0, angle, 0.0),
            KeyCode::ArrowLeft => scene.node_by_id_mut(&self.ids, "root")?.rotate(0.0, -angle, 0.0),
            KeyCode::KeyD => {
                let hinge = self.ids.path("door hinge")?.clone();
                let swing = 90.0 / ANIMATION_STEPS as f32;
                Self::animate(animations, move |scene: &mut Scene<B>, direction, _step| {
                    let hinge = scene.node_mut(&hinge)?;
                    hinge.rotate(0.0, -swing * direction.sign() as f32, 0.0);
                    Ok(())
                })?;
            }
            KeyCode::KeyL => {
                let start = scene.light_position();
                Self::animate(animations, move |scene: &mut Scene<B>, _direction, step| {
                    let offset = 0.6 * step as f32;
                    scene.set_light_position(start + Vector3::new(offset, 0.0, 0.0));
                    Ok(())
                })?;
            }
            KeyCode::KeyP => {
                let roof = self.ids.path("roof")?.clone();
                Self::animate(animations, move |scene: &mut Scene<B>, _direction, step| {
                    let t = step as f32 / ANIMATION_STEPS as f32;
                    scene.node_mut(&roof)?.set_color(blend(ROOF_COLOR, ROOF_PULSE_COLOR, t));
                    Ok(())
                })?;
            }
            KeyCode::KeyA => {
                for axis in scene.axes_mut() {
                    axis.visible = !axis.visible;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::default()
        .with_title("Mountjoy House")
        .with_asset_root(env!("CARGO_MANIFEST_DIR"));
    BothyApp::new(config, House::default()).run()
}
