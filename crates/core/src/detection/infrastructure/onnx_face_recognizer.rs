/// Face recognizer on ONNX Runtime: YOLO finds faces, ArcFace embeds them,
/// and embeddings are matched against a gallery of enrolled photos.
use std::path::Path;

use crate::capture::infrastructure::image_sequence_source::is_image;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_adapter::DetectionAdapter;
use crate::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use crate::shared::frame::Frame;
use crate::shared::model_resolver;
use crate::shared::region::Region;

use super::embedding_gallery::{self, EmbeddingGallery, DEFAULT_MATCH_THRESHOLD};
use super::yolo_decoding::{self, DEFAULT_CONFIDENCE, NMS_IOU_THRESH};

/// Fallback YOLO input resolution when the model shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub struct OnnxFaceRecognizer {
    detector: ort::session::Session,
    embedder: ort::session::Session,
    input_size: u32,
    gallery: EmbeddingGallery,
}

impl OnnxFaceRecognizer {
    /// Resolves both models (downloading into the cache if needed) and
    /// enrolls every image in `gallery_dir` under its file stem.
    pub fn load(
        gallery_dir: &Path,
        model_dir: Option<&Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let yolo_path = model_resolver::resolve(YOLO_MODEL_NAME, YOLO_MODEL_URL, model_dir)?;
        let embed_path =
            model_resolver::resolve(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, model_dir)?;

        let detector = ort::session::Session::builder()?.commit_from_file(&yolo_path)?;
        let input_size = detector
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let embedder = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(&embed_path)?;

        let mut recognizer = Self {
            detector,
            embedder,
            input_size,
            gallery: EmbeddingGallery::new(DEFAULT_MATCH_THRESHOLD),
        };
        recognizer.enroll_dir(gallery_dir)?;
        Ok(recognizer)
    }

    fn enroll_dir(&mut self, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| format!("cannot read gallery {}: {e}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image(p))
            .collect();
        paths.sort();

        for path in paths {
            let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let img = image::open(&path)
                .map_err(|e| format!("cannot decode {}: {e}", path.display()))?
                .to_rgb8();
            let (w, h) = img.dimensions();
            let photo = Frame::new(img.into_raw(), w, h, 0);

            // Enroll the largest face, or the whole photo if none is found.
            let face = self
                .locate(&photo)?
                .into_iter()
                .max_by_key(Region::area)
                .and_then(|r| photo.crop(&r))
                .unwrap_or(photo);
            let embedding = self.embed(&face)?;
            self.gallery.enroll(label, embedding);
            log::debug!("Enrolled '{label}' from {}", path.display());
        }

        if self.gallery.is_empty() {
            return Err(format!("gallery {} has no images", dir.display()).into());
        }
        log::info!(
            "Enrolled {} face(s) for {} label(s)",
            self.gallery.len(),
            self.gallery.labels().len()
        );
        Ok(())
    }

    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let (tensor, letterbox) = yolo_decoding::letterbox(frame, self.input_size);
        let input = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.detector.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let output = outputs[0].try_extract_array::<f32>()?;
        let data = output.as_slice().ok_or("cannot get YOLO output slice")?;
        let boxes = yolo_decoding::decode(data, output.shape(), letterbox, DEFAULT_CONFIDENCE)?;

        Ok(yolo_decoding::nms(boxes, NMS_IOU_THRESH)
            .iter()
            .filter_map(|b| b.to_region(frame.width(), frame.height()))
            .collect())
    }

    fn embed(&mut self, face: &Frame) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let input = ort::value::Tensor::from_array(embedding_gallery::preprocess(face))?;
        let outputs = self.embedder.run(ort::inputs![input])?;
        let embedding = outputs[0].try_extract_array::<f32>()?;
        let mut embedding = embedding
            .as_slice()
            .ok_or("cannot get embedding slice")?
            .to_vec();
        embedding_gallery::l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

impl DetectionAdapter for OnnxFaceRecognizer {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let regions = self.locate(frame)?;
        let mut faces = Vec::with_capacity(regions.len());
        let mut embeddings = Vec::with_capacity(regions.len());
        for region in regions {
            if let Some(crop) = frame.crop(&region) {
                embeddings.push(self.embed(&crop)?);
                faces.push(region);
            }
        }

        let labels = self.gallery.assign(&embeddings);
        Ok(faces
            .into_iter()
            .zip(labels)
            .map(|(region, label)| match label {
                Some(label) => Detection::known(region, &label),
                None => Detection::unknown(region),
            })
            .collect())
    }

    fn labels(&self) -> Vec<String> {
        self.gallery.labels()
    }
}
