//! Drives whole scenes through the recording backend

use std::time::{Duration, Instant};

use bothy::animation::{AnimationController, StepDirection};
use bothy::config::SceneConfig;
use bothy::gfx::backend::{Command, GraphicsBackend, Primitive, RecordingBackend, TextureHandle};
use bothy::gfx::resources::{MemoryImageLoader, TextureImage};
use bothy::gfx::scene::{AxisHelper, IdTable, Scene, ShapeBuilder};
use bothy::gfx::shader;
use bothy::{BothyError, Result, SceneScript};
use cgmath::{Matrix4, Vector3, Vector4};
use winit::keyboard::KeyCode;

fn new_scene() -> Scene<RecordingBackend> {
    Scene::new(RecordingBackend::new(), (800, 600), SceneConfig::default()).unwrap()
}

fn arm() -> Vec<ShapeBuilder> {
    vec![ShapeBuilder::cube(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], &[0.5, 0.5, 0.5])
        .id("base")
        .child(ShapeBuilder::cube(&[2.0, 0.0, 0.0], &[1.0, 1.0, 1.0], &[0.9, 0.1, 0.1]).id("arm"))]
}

fn origin(model: &Matrix4<f32>) -> Vector3<f32> {
    (*model * Vector4::new(0.0, 0.0, 0.0, 1.0)).truncate()
}

fn assert_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    let error = actual - expected;
    assert!(
        error.x.abs() < 1e-4 && error.y.abs() < 1e-4 && error.z.abs() < 1e-4,
        "{:?} != {:?}",
        actual,
        expected
    );
}

fn model_uploads(scene: &Scene<RecordingBackend>) -> Vec<Matrix4<f32>> {
    scene.backend().mat4_uploads(shader::U_MODEL_MATRIX).collect()
}

#[test]
fn test_rotation_through_id_table_reaches_drawn_node() {
    let mut scene = new_scene();
    let ids = scene.add_built(arm()).unwrap();

    scene.draw().unwrap();
    assert_close(origin(&model_uploads(&scene)[1]), Vector3::new(2.0, 0.0, 0.0));

    scene.node_by_id_mut(&ids, "base").unwrap().rotate(0.0, 90.0, 0.0);
    scene.backend_mut().clear_commands();
    scene.draw().unwrap();

    let models = model_uploads(&scene);
    assert_eq!(models.len(), 2);
    assert_close(origin(&models[0]), Vector3::new(0.0, 0.0, 0.0));
    assert_close(origin(&models[1]), Vector3::new(0.0, 0.0, -2.0));
}

#[test]
fn test_scaled_parent_leaves_child_unscaled() {
    let mut scene = new_scene();
    let ids = scene
        .add_built([ShapeBuilder::cube(&[0.0; 3], &[2.0, 2.0, 2.0], &[0.5; 3])
            .id("plinth")
            .child(ShapeBuilder::cube(&[1.0, 0.0, 0.0], &[1.0; 3], &[0.9, 0.1, 0.1]))])
        .unwrap();
    scene.draw().unwrap();

    let models = model_uploads(&scene);
    assert_close(origin(&models[1]), Vector3::new(1.0, 0.0, 0.0));
    let corner = (models[1] * Vector4::new(0.5, 0.5, 0.5, 1.0)).truncate();
    assert_close(corner, Vector3::new(1.5, 0.5, 0.5));

    scene.node_by_id_mut(&ids, "plinth").unwrap().rotate(0.0, 90.0, 0.0);
    scene.backend_mut().clear_commands();
    scene.draw().unwrap();
    assert_close(origin(&model_uploads(&scene)[1]), Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn test_ids_stay_valid_after_later_roots() {
    let mut scene = new_scene();
    scene.add_axis(AxisHelper::default());
    let first = scene.add_built(arm()).unwrap();
    let second = scene
        .add_built([ShapeBuilder::prism(&[0.0, 5.0, 0.0], &[2.0, 1.0, 2.0], &[0.0, 1.0, 1.0]).id("roof")])
        .unwrap();

    assert_eq!(first.path("arm").unwrap().root_index(), 1);
    assert_eq!(second.path("roof").unwrap().root_index(), 2);

    scene.node_by_id_mut(&second, "roof").unwrap().set_color([1.0, 0.0, 0.0]);
    assert_eq!(scene.node_by_id_mut(&second, "roof").unwrap().color(), [1.0, 0.0, 0.0]);
    assert_eq!(scene.node_by_id_mut(&first, "arm").unwrap().color(), [0.9, 0.1, 0.1]);
}

#[test]
fn test_lookup_errors() {
    let mut scene = new_scene();
    let ids = scene.add_built(arm()).unwrap();

    assert!(matches!(
        scene.node_by_id_mut(&ids, "chimney"),
        Err(BothyError::UnknownIdentifier(name)) if name == "chimney"
    ));
    assert!(matches!(
        scene.node_by_id_mut(&IdTable::new(), "base"),
        Err(BothyError::UnknownIdentifier(_))
    ));

    let duplicate = scene.add_built([
        ShapeBuilder::cube(&[0.0; 3], &[1.0; 3], &[1.0; 3]).id("wall"),
        ShapeBuilder::cube(&[1.0; 3], &[1.0; 3], &[1.0; 3]).id("wall"),
    ]);
    assert!(matches!(duplicate, Err(BothyError::Validation(_))));
    assert_eq!(scene.roots().len(), 1);
}

#[test]
fn test_frame_protocol() {
    let mut scene = new_scene();
    scene.set_background_color([0.1, 0.2, 0.3]);
    scene.add_built(arm()).unwrap();
    scene.add_axis(AxisHelper::new([1.0, 1.0, 0.0]));
    scene.draw().unwrap();

    let commands = scene.backend().commands();
    assert_eq!(commands.first(), Some(&Command::Clear([0.1, 0.2, 0.3])));
    assert_eq!(commands.last(), Some(&Command::FinishFrame));

    let draws: Vec<&Command> = scene.backend().draw_calls().collect();
    assert_eq!(
        draws,
        vec![
            &Command::DrawIndexed { primitive: Primitive::Triangles, count: 36 },
            &Command::DrawIndexed { primitive: Primitive::Triangles, count: 36 },
            &Command::DrawArrays { primitive: Primitive::Lines, count: 6 },
        ]
    );
    assert_eq!(scene.backend().last_bool(shader::U_IS_LIGHTING), Some(false));
    assert_eq!(scene.backend().frames(), 1);
}

#[test]
fn test_textured_scene() {
    let mut scene = new_scene();
    let loader = MemoryImageLoader::new()
        .with_image("res/redbrick.jpg", TextureImage::solid([180, 60, 40, 255]));
    pollster::block_on(scene.load_textures(&["res/redbrick.jpg"], &loader)).unwrap();

    scene
        .add_built([ShapeBuilder::cube(&[0.0; 3], &[8.0, 0.35, 8.0], &[1.0, 0.8, 0.6])
            .texture("res/redbrick.jpg", 8.0, 0.4)])
        .unwrap();
    scene.backend_mut().clear_commands();
    scene.draw().unwrap();

    let commands = scene.backend().commands();
    assert!(commands.contains(&Command::BindTexture { unit: 0, handle: TextureHandle(0) }));
    let tex_coords = commands
        .iter()
        .find_map(|command| match command {
            Command::UploadAttribute { name, data, components: 2 } if name == shader::A_TEX_COORDS => {
                Some(data.clone())
            }
            _ => None,
        })
        .unwrap();
    assert!(tex_coords.iter().step_by(2).all(|u| (0.0..=8.0).contains(u)));
    assert!(tex_coords.iter().skip(1).step_by(2).all(|v| (0.0..=0.4).contains(v)));
    assert_eq!(scene.backend().last_bool(shader::U_USE_TEXTURES), Some(true));
}

#[test]
fn test_missing_texture_fails_the_draw() {
    let mut scene = new_scene();
    scene
        .add_built([ShapeBuilder::cube(&[0.0; 3], &[1.0; 3], &[1.0; 3]).texture_uniform("res/window.jpg", 1.0)])
        .unwrap();

    assert!(matches!(scene.draw(), Err(BothyError::ResourceLookup(_))));
}

#[test]
fn test_animation_drives_scene_redraws() {
    let mut scene = new_scene();
    let ids = scene
        .add_built([ShapeBuilder::pivot(&[-0.4, 1.0, 4.0])
            .id("hinge")
            .child(ShapeBuilder::cube(&[0.4, 0.0, 0.0], &[0.8, 1.3, 0.06], &[0.35, 0.2, 0.1]))])
        .unwrap();
    let hinge = ids.path("hinge").unwrap().clone();

    let mut animations = AnimationController::new();
    animations
        .run(
            1000,
            10,
            move |scene: &mut Scene<RecordingBackend>, direction: StepDirection, _step| {
                scene.node_mut(&hinge)?.rotate(0.0, -9.0 * direction.sign() as f32, 0.0);
                Ok(())
            },
            None,
        )
        .unwrap();

    let halfway = animations.next_deadline().unwrap() + Duration::from_millis(900);
    assert_eq!(animations.poll(halfway, &mut scene).unwrap(), 10);
    assert_eq!(scene.node_by_id_mut(&ids, "hinge").unwrap().rotation().y, 270.0);

    let later = Instant::now() + Duration::from_secs(10);
    assert_eq!(animations.poll(later, &mut scene).unwrap(), 10);
    assert!(!animations.is_running());
    assert_eq!(scene.backend().frames(), 20);
    assert_eq!(scene.node_by_id_mut(&ids, "hinge").unwrap().rotation().y, 0.0);
}

/// Minimal script exercised without a window
#[derive(Default)]
struct Tower {
    ids: IdTable,
}

impl<B: GraphicsBackend + 'static> SceneScript<B> for Tower {
    fn build(&mut self, scene: &mut Scene<B>) -> Result<()> {
        self.ids = scene.add_built([ShapeBuilder::cube(&[0.0; 3], &[1.0, 4.0, 1.0], &[0.7; 3]).id("tower")])?;
        Ok(())
    }

    fn on_key(
        &mut self,
        key: KeyCode,
        scene: &mut Scene<B>,
        _animations: &mut AnimationController<Scene<B>>,
    ) -> Result<()> {
        if key == KeyCode::ArrowRight {
            scene.node_by_id_mut(&self.ids, "tower")?.rotate(0.0, 10.0, 0.0);
        }
        Ok(())
    }
}

#[test]
fn test_scene_script_runs_headless() {
    let mut tower = Tower::default();
    let mut scene = Scene::new(
        RecordingBackend::new(),
        (640, 480),
        SceneScript::<RecordingBackend>::scene_config(&tower),
    )
    .unwrap();
    let mut animations = AnimationController::new();

    tower.build(&mut scene).unwrap();
    for _ in 0..37 {
        tower.on_key(KeyCode::ArrowRight, &mut scene, &mut animations).unwrap();
    }
    tower.on_key(KeyCode::KeyQ, &mut scene, &mut animations).unwrap();

    assert_eq!(scene.node_by_id_mut(&tower.ids, "tower").unwrap().rotation().y, 10.0);
    assert!(SceneScript::<RecordingBackend>::textures(&tower).is_empty());
}
