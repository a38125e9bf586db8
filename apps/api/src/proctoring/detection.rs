use serde::Deserialize;

pub const MULTIPLE_PEOPLE: &str = "⚠️ Multiple people detected";
pub const CELL_PHONE: &str = "📱 Cell phone detected";
pub const NOT_LOOKING: &str = "👀 Not looking at screen";

/// Nose offset from the eye midpoint, in pixels, at which a face counts as looking away.
pub const GAZE_DEVIATION_PX: f64 = 20.0;

const PERSON_LABEL: &str = "person";
const CELL_PHONE_LABEL: &str = "cell phone";

/// One object-detector hit. Scores and boxes sent by the detector are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    pub label: String,
}

/// Horizontal landmark position normalized to `[0, 1]` of the frame width.
/// Other coordinates are ignored; gaze is judged on the x axis only.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Point {
    pub x: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceLandmarks {
    pub nose_tip: Point,
    pub left_eye: Point,
    pub right_eye: Point,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub faces: Vec<FaceLandmarks>,
}

fn to_px(normalized: f64, frame_width: u32) -> i64 {
    // truncates toward zero
    (normalized * frame_width as f64) as i64
}

pub fn is_looking_straight(face: &FaceLandmarks, frame_width: u32) -> bool {
    let nose_x = to_px(face.nose_tip.x, frame_width);
    let left_eye_x = to_px(face.left_eye.x, frame_width);
    let right_eye_x = to_px(face.right_eye.x, frame_width);
    let face_center = (left_eye_x + right_eye_x) as f64 / 2.0;
    (nose_x as f64 - face_center).abs() < GAZE_DEVIATION_PX
}

/// Warnings for one frame, in rule order. Each face looking away adds its own entry.
pub fn evaluate_frame(frame: &Frame) -> Vec<String> {
    let mut warnings = Vec::new();

    let people = frame
        .detections
        .iter()
        .filter(|d| d.label == PERSON_LABEL)
        .count();
    if people > 1 {
        warnings.push(MULTIPLE_PEOPLE.to_string());
    }
    if frame.detections.iter().any(|d| d.label == CELL_PHONE_LABEL) {
        warnings.push(CELL_PHONE.to_string());
    }
    for face in &frame.faces {
        if !is_looking_straight(face, frame.width) {
            warnings.push(NOT_LOOKING.to_string());
        }
    }

    warnings
}

/// Warnings in `current` that were not on the board before.
pub fn newly_raised(previous: &[String], current: &[String]) -> Vec<String> {
    current
        .iter()
        .filter(|w| !previous.contains(w))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(label: &str) -> Detection {
        Detection {
            label: label.to_string(),
        }
    }

    fn face(nose_x: f64, left_x: f64, right_x: f64) -> FaceLandmarks {
        FaceLandmarks {
            nose_tip: Point { x: nose_x },
            left_eye: Point { x: left_x },
            right_eye: Point { x: right_x },
        }
    }

    fn frame(detections: Vec<Detection>, faces: Vec<FaceLandmarks>) -> Frame {
        Frame {
            width: 640,
            height: 480,
            detections,
            faces,
        }
    }

    #[test]
    fn test_single_person_is_clean() {
        let f = frame(vec![detection("person")], vec![face(0.5, 0.4, 0.6)]);
        assert!(evaluate_frame(&f).is_empty());
    }

    #[test]
    fn test_multiple_people_and_phone() {
        let f = frame(
            vec![detection("person"), detection("person"), detection("cell phone")],
            vec![],
        );
        assert_eq!(evaluate_frame(&f), vec![MULTIPLE_PEOPLE, CELL_PHONE]);
    }

    #[test]
    fn test_gaze_threshold_in_pixels() {
        // eyes at 256 and 384 px -> centre 320; nose at 339 px is 19 px off
        assert!(is_looking_straight(&face(0.53, 0.4, 0.6), 640));
        // nose at 340 px is exactly 20 px off
        assert!(!is_looking_straight(&face(340.0 / 640.0, 0.4, 0.6), 640));
    }

    #[test]
    fn test_each_face_looking_away_warns() {
        let f = frame(
            vec![detection("person")],
            vec![face(0.8, 0.4, 0.6), face(0.1, 0.4, 0.6), face(0.5, 0.4, 0.6)],
        );
        assert_eq!(evaluate_frame(&f), vec![NOT_LOOKING, NOT_LOOKING]);
    }

    #[test]
    fn test_newly_raised_by_membership() {
        let previous = vec![CELL_PHONE.to_string()];
        let current = vec![MULTIPLE_PEOPLE.to_string(), CELL_PHONE.to_string()];
        assert_eq!(newly_raised(&previous, &current), vec![MULTIPLE_PEOPLE]);
        assert!(newly_raised(&current, &previous).is_empty());
    }

    #[test]
    fn test_frame_accepts_extra_detector_fields() {
        let f: Frame = serde_json::from_value(serde_json::json!({
            "width": 640,
            "height": 480,
            "detections": [
                {"label": "person", "confidence": 0.97, "bbox": [10, 20, 200, 400]},
                {"label": "cell phone", "confidence": 0.61}
            ],
            "faces": [{
                "nose_tip": {"x": 0.5, "y": 0.55, "z": -0.02},
                "left_eye": {"x": 0.4, "y": 0.42},
                "right_eye": {"x": 0.6, "y": 0.42}
            }]
        }))
        .unwrap();

        assert_eq!(f.detections.len(), 2);
        assert_eq!(evaluate_frame(&f), vec![CELL_PHONE]);
    }
}
