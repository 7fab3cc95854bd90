//! End-to-end pipeline tests against a mocked inference engine

mod common;

use bgrestore::{
    decode_image, euclidean_distance, normalize, pipeline, ChromaKeyRemover, InferenceBackend,
    InputRange, PipelineError, RemoverKind, ServiceConfig, ServiceContext, FRAME_SIDE,
};
use common::{encoded_scene, test_scene, MockBackend};

fn context_with(backend: MockBackend) -> ServiceContext {
    let config = ServiceConfig {
        default_remover: RemoverKind::Chroma,
        input_range: InputRange::SymmetricOne,
        ..ServiceConfig::default()
    };
    let mut backend = backend;
    backend.initialize(&config).unwrap();
    ServiceContext::with_backend(config, Box::new(backend))
}

#[test]
fn test_full_pipeline_large_jpeg_sized_input() {
    // Scenario: 1024x768 color input flows through decode, removal,
    // normalization and restoration into an exact 512x512 frame.
    let ctx = context_with(MockBackend::identity());
    let image = decode_image(&encoded_scene(1024, 768)).unwrap();

    let (feature, restored) = pipeline::process_single(&ctx, &image).unwrap();
    assert_eq!(feature.as_image().dimensions(), (FRAME_SIDE, FRAME_SIDE));
    assert_eq!(restored.dimensions(), (FRAME_SIDE, FRAME_SIDE));

    // Identity engine: the restored frame equals the feature frame
    assert_eq!(restored, *feature.as_image());
}

#[test]
fn test_full_pipeline_small_input_resizes() {
    // Scenario: 400x300 input clamps the crop, then resizes to 512x512
    let ctx = context_with(MockBackend::identity());
    let image = decode_image(&encoded_scene(400, 300)).unwrap();

    let (feature, restored) = pipeline::process_single(&ctx, &image).unwrap();
    assert_eq!(feature.as_image().dimensions(), (FRAME_SIDE, FRAME_SIDE));
    assert_eq!(restored.dimensions(), (FRAME_SIDE, FRAME_SIDE));
}

#[test]
fn test_run_method_resizes_mismatched_output() {
    // Scenario: the engine returns a 256x256 frame; the run resizes it to
    // the feature shape and scores it without panicking.
    let ctx = context_with(MockBackend::constant(256, 256, 1.0));
    let image = test_scene(800, 600);
    let remover = ChromaKeyRemover::new();

    let run = pipeline::run_method(&ctx, &image, &remover).unwrap();
    assert_eq!(run.restored.dimensions(), (FRAME_SIDE, FRAME_SIDE));
    assert!(run.distance.is_finite());
}

#[test]
fn test_inference_failure_is_surfaced_not_swallowed() {
    let ctx = context_with(MockBackend::failing());
    let image = test_scene(640, 640);

    let result = pipeline::process_single(&ctx, &image);
    match result {
        Err(PipelineError::Inference(msg)) => assert!(msg.contains("engine unavailable")),
        other => panic!("expected inference error, got {other:?}"),
    }
}

#[test]
fn test_removed_background_is_white_in_feature() {
    // The chroma remover flattens the green canvas to white; after luma
    // conversion the background of the feature frame is 255.
    let ctx = context_with(MockBackend::identity());
    let image = test_scene(1024, 1024);

    let (feature, _) = pipeline::process_single(&ctx, &image).unwrap();
    assert_eq!(feature.as_image().get_pixel(5, 5).0[0], 255);
}

#[test]
fn test_identity_engine_scores_zero_distance() {
    let ctx = context_with(MockBackend::identity());
    let image = test_scene(800, 800);
    let remover = ChromaKeyRemover::new();

    let run = pipeline::run_method(&ctx, &image, &remover).unwrap();
    assert!(run.distance.abs() < f32::EPSILON);
}

#[test]
fn test_distance_matches_normalized_frames() {
    // Cross-check the scoring helper on frames produced by the pipeline
    let white = normalize(&test_scene(512, 512));
    let also_white = normalize(&test_scene(512, 512));
    assert!(euclidean_distance(white.as_image(), also_white.as_image()).abs() < f32::EPSILON);
}
