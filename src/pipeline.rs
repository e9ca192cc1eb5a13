use anyhow::Result;
use image::{GrayImage, RgbImage};
use tracing::{debug, span, warn, Level};

pub mod detection;
pub mod eyes;
pub mod facing;
pub mod landmarks;
pub mod model;
pub mod planner;
pub mod pose;
pub mod pupil;
pub mod select;

use crate::annotate;
use crate::config::GazeConfig;
use crate::error::GazeError;
use crate::shapes::point::Point;
use crate::shapes::rect::Rect;
use crate::transport::{ActuatorLink, SerialLink};
use eyes::EyeRegion;
use facing::Facing;
use landmarks::{FaceLandmarks, LandmarkProvider, MeshLandmarkProvider};
use pose::{GeometricPoseSolver, PoseEstimate, PosePoints, PoseSolver};
use pupil::PupilLocator;

/// Diagnostics for one face. Returned by value per frame, never
/// aliased across frames or faces.
#[derive(Debug, Clone, Copy)]
pub struct FaceReport {
    pub facing: Facing,
    pub pose: PoseEstimate,
    pub pupil_l: Option<Point>,
    pub pupil_r: Option<Point>,
}

/// Per-frame result. `faces` is index-aligned with the detected face
/// list; a slot is `None` when that face's analysis failed (the
/// failure is logged, the rest of the frame is unaffected).
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub gaze_facing: bool,
    pub dominant: Option<usize>,
    pub crop: Option<Rect>,
    pub steering: Option<f32>,
    pub faces: Vec<Option<FaceReport>>,
}

impl FrameReport {
    fn empty() -> FrameReport {
        FrameReport {
            gaze_facing: false,
            dominant: None,
            crop: None,
            steering: None,
            faces: Vec::new(),
        }
    }
}

/// The per-frame decision pipeline: landmarks, pose, pupils, facing
/// classification, dominant-face selection, crop and steering
/// planning. One instance per video source; configuration is fixed at
/// construction.
pub struct GazePipeline {
    landmarker: Box<dyn LandmarkProvider>,
    pose_solver: Box<dyn PoseSolver>,
    pupil_locator: Option<Box<dyn PupilLocator>>,
    link: Option<Box<dyn ActuatorLink>>,
    config: GazeConfig,
}

impl GazePipeline {
    pub fn new(config: GazeConfig) -> Result<GazePipeline> {
        let landmarker = Box::new(MeshLandmarkProvider::new(
            &config.detector_model,
            &config.mesh_model,
        )?);

        // A dead actuator is not fatal; steering just goes quiet.
        let link: Option<Box<dyn ActuatorLink>> = if config.steering.enabled {
            match SerialLink::open(&config.steering.port) {
                Ok(l) => Some(Box::new(l)),
                Err(e) => {
                    warn!("actuator unavailable, steering disabled: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::with_components(
            config,
            landmarker,
            Box::new(GeometricPoseSolver::default()),
            link,
        ))
    }

    /// Assemble a pipeline from explicit collaborators. This is the
    /// seam tests (and alternative providers) use.
    pub fn with_components(
        config: GazeConfig,
        landmarker: Box<dyn LandmarkProvider>,
        pose_solver: Box<dyn PoseSolver>,
        link: Option<Box<dyn ActuatorLink>>,
    ) -> GazePipeline {
        let pupil_locator = pupil::from_mode(config.pupil_mode);
        GazePipeline {
            landmarker,
            pose_solver,
            pupil_locator,
            link,
            config,
        }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Run one frame to completion. The frame is annotated in place
    /// when annotation is enabled; the returned report carries the
    /// crop rectangle for the caller to apply.
    pub fn process(&mut self, frame: &mut RgbImage) -> Result<FrameReport> {
        let process_span = span!(Level::DEBUG, "frame");
        let _guard = process_span.enter();

        let gray = image::imageops::grayscale(frame);
        let faces = self.landmarker.faces(&gray)?;

        if faces.is_empty() {
            debug!("{}", GazeError::DetectionEmpty);
            return Ok(FrameReport::empty());
        }

        let mut reports = Vec::with_capacity(faces.len());
        for face in &faces {
            reports.push(self.analyze_face(&gray, frame, face));
        }

        let dominant = select::dominant(&faces);

        let mut report = FrameReport {
            gaze_facing: false,
            dominant,
            crop: None,
            steering: None,
            faces: reports,
        };

        if let Some(idx) = dominant {
            let bounds = faces[idx].bounds;

            report.gaze_facing = report.faces[idx]
                .as_ref()
                .map_or(false, |r| r.facing.gaze_facing);

            if self.config.steering.enabled {
                report.steering =
                    planner::plan_steering(bounds, frame.width(), &self.config.steering);
                if let (Some(step), Some(link)) = (report.steering, self.link.as_mut()) {
                    // Best effort; a lost step is corrected next frame.
                    if let Err(e) = link.send_step(step) {
                        warn!("{e}");
                    }
                }
            }

            if self.config.crop.enabled {
                report.crop = Some(planner::plan_crop(
                    bounds,
                    frame.width(),
                    frame.height(),
                    &self.config.crop,
                ));
            }
        }

        Ok(report)
    }

    fn analyze_face(
        &self,
        gray: &GrayImage,
        frame: &mut RgbImage,
        face: &FaceLandmarks,
    ) -> Option<FaceReport> {
        let pose = match self
            .pose_solver
            .solve(gray.width(), gray.height(), &PosePoints::from(face))
        {
            Ok(p) => p,
            Err(e) => {
                warn!("pose solve failed for one face: {e}");
                return None;
            }
        };

        let mut pupil_l = None;
        let mut pupil_r = None;
        let mut ratios = None;
        let mut regions = None;

        if let Some(locator) = &self.pupil_locator {
            // Pupil failures degrade this face to pose-only facing.
            match self.locate_pupils(gray, face, locator.as_ref()) {
                Ok(found) => {
                    ratios = Some(found.ratios);
                    pupil_l = Some(found.pupil_l);
                    pupil_r = Some(found.pupil_r);
                    regions = Some(found.regions);
                }
                Err(e) => warn!("pupil estimation failed for one face: {e}"),
            }
        }

        let facing = facing::classify(pose.pitch, pose.yaw, ratios, &self.config.facing);
        debug!(
            pitch = pose.pitch,
            yaw = pose.yaw,
            face_facing = facing.face_facing,
            gaze_facing = facing.gaze_facing,
            "face classified"
        );

        if self.config.annotate {
            let regions_ref = regions.as_ref().map(|(l, r)| (l, r));
            if let Err(e) = annotate::draw_face(frame, face, &pose, regions_ref, (pupil_l, pupil_r))
            {
                warn!("{e}");
            }
        }

        Some(FaceReport {
            facing,
            pose,
            pupil_l,
            pupil_r,
        })
    }

    fn locate_pupils(
        &self,
        gray: &GrayImage,
        face: &FaceLandmarks,
        locator: &dyn PupilLocator,
    ) -> crate::error::Result<LocatedPupils> {
        let (left, right) = eyes::eye_regions(
            face,
            self.config.eye_padding_h,
            self.config.eye_padding_v,
        )?;

        let pupil_l = locate_in_region(gray, &left, locator)?;
        let pupil_r = locate_in_region(gray, &right, locator)?;
        let ratios = eyes::pupil_ratios(face, pupil_l, pupil_r)?;

        Ok(LocatedPupils {
            ratios,
            pupil_l,
            pupil_r,
            regions: (left, right),
        })
    }
}

struct LocatedPupils {
    ratios: (f32, f32),
    pupil_l: Point,
    pupil_r: Point,
    regions: (EyeRegion, EyeRegion),
}

fn locate_in_region(
    gray: &GrayImage,
    region: &EyeRegion,
    locator: &dyn PupilLocator,
) -> crate::error::Result<Point> {
    let clamped = region
        .rect
        .clamp_to(gray.width(), gray.height())
        .ok_or(GazeError::GeometryDegenerate {
            context: "eye region outside frame",
        })?;

    let crop = image::imageops::crop_imm(
        gray,
        clamped.x as u32,
        clamped.y as u32,
        clamped.w as u32,
        clamped.h as u32,
    )
    .to_image();

    let local = locator.locate(&crop)?;
    Ok(local.offset_by(Point::new(clamped.x, clamped.y)))
}
