// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::{ Path, PathBuf };

use quick_xml::events::{ BytesStart, Event };
use quick_xml::Reader;
use thiserror::Error;

use crate::core::articulation::{ Articulation, TankPivots, TankState, DEFAULT_HEIGHT_OFFSET };
use crate::core::error::TurretError;
use crate::core::view::ViewContext;
use crate::math::constants::{ Float, Vector3f };
use crate::math::projection::Viewport;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid scene: {0}")]
    Invalid(#[from] TurretError),
}

/// Everything the tank demo needs to start: the rig, its initial pose,
/// an optional model file and the camera.
#[derive(Debug, Clone)]
pub struct TankScene {
    pub articulation: Articulation,
    pub state: TankState,
    pub mesh_path: Option<PathBuf>,
    pub view: ViewContext,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<TankScene, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir)
}

pub fn parse_scene(xml: &str, base_dir: &Path) -> Result<TankScene, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();

    let mut in_tank = false;
    let mut in_state = false;
    let mut in_sensor = false;
    let mut in_film = false;
    let mut in_transform = false;
    let mut seen_tank = false;

    let mut height_offset: Float = DEFAULT_HEIGHT_OFFSET;
    let mut turret_pivot: Option<Vector3f> = None;
    let mut barrel_pivot: Option<Vector3f> = None;
    let mut join_pivot: Option<Vector3f> = None;
    let mut state = TankState::default();
    let mut mesh_path: Option<PathBuf> = None;

    let mut fov_deg: Float = 45.0;
    let mut near_clip: Float = 0.1;
    let mut far_clip: Float = 100.0;
    let mut origin = Vector3f::new(0.0, 3.0, 8.0);
    let mut target = Vector3f::zeros();
    let mut up = Vector3f::y();
    let mut width: usize = 800;
    let mut height: usize = 600;

    loop {
        let event = reader.read_event_into(&mut buf);
        // Empty elements never see an End event, so only Start opens a section.
        let opened = matches!(event, Ok(Event::Start(_)));
        match event {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"default" => {
                        let attrs = attributes(&e, &HashMap::new());
                        if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                            defaults.insert(k.clone(), v.clone());
                        }
                    }
                    b"tank" => {
                        in_tank = opened;
                        seen_tank = true;
                    }
                    b"state" => {
                        if in_tank {
                            in_state = opened;
                        }
                    }
                    b"sensor" => {
                        let attrs = attributes(&e, &defaults);
                        let sensor_type = attrs.get("type").map(|s| s.as_str()).unwrap_or("perspective");
                        if sensor_type != "perspective" {
                            return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", sensor_type)));
                        }
                        in_sensor = opened;
                    }
                    b"film" => {
                        if in_sensor {
                            in_film = opened;
                        }
                    }
                    b"transform" => {
                        let attrs = attributes(&e, &defaults);
                        in_transform = opened && in_sensor && attrs.get("name").map(|s| s.as_str()) == Some("to_world");
                    }
                    b"lookat" => {
                        if in_sensor && in_transform {
                            let attrs = attributes(&e, &defaults);
                            origin = parse_vec3(required(&attrs, "origin")?)?;
                            target = parse_vec3(required(&attrs, "target")?)?;
                            if let Some(u) = attrs.get("up") {
                                up = parse_vec3(u)?;
                            }
                        }
                    }
                    b"float" => {
                        let attrs = attributes(&e, &defaults);
                        let name = required(&attrs, "name")?;
                        let value = parse_float(required(&attrs, "value")?)?;
                        if in_state {
                            match name {
                                "rotation" => state.rotation = value,
                                "turret_rotation" => state.turret_rotation = value,
                                "barrel_elevation" => state.barrel_elevation = value,
                                _ => log::warn!("Unknown tank state field: {}.", name),
                            }
                        } else if in_tank {
                            match name {
                                "height_offset" => height_offset = value,
                                _ => log::warn!("Unknown tank field: {}.", name),
                            }
                        } else if in_sensor {
                            match name {
                                "fov" => fov_deg = value,
                                "near_clip" => near_clip = value,
                                "far_clip" => far_clip = value,
                                _ => log::warn!("Unknown sensor field: {}.", name),
                            }
                        }
                    }
                    b"point" => {
                        let attrs = attributes(&e, &defaults);
                        let name = required(&attrs, "name")?;
                        let value = parse_vec3(required(&attrs, "value")?)?;
                        if in_state && name == "position" {
                            state.position = value;
                        } else if in_tank {
                            match name {
                                "turret_pivot" => turret_pivot = Some(value),
                                "barrel_pivot" => barrel_pivot = Some(value),
                                "join_pivot" => join_pivot = Some(value),
                                _ => log::warn!("Unknown tank point: {}.", name),
                            }
                        }
                    }
                    b"string" => {
                        let attrs = attributes(&e, &defaults);
                        if in_tank && attrs.get("name").map(|s| s.as_str()) == Some("filename") {
                            let file = required(&attrs, "value")?;
                            mesh_path = Some(base_dir.join(file));
                        }
                    }
                    b"integer" => {
                        if in_film {
                            let attrs = attributes(&e, &defaults);
                            let name = required(&attrs, "name")?;
                            let value = parse_usize(required(&attrs, "value")?)?;
                            match name {
                                "width" => width = value,
                                "height" => height = value,
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"tank" => in_tank = false,
                    b"state" => in_state = false,
                    b"sensor" => in_sensor = false,
                    b"film" => in_film = false,
                    b"transform" => in_transform = false,
                    _ => {}
                }
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if !seen_tank {
        return Err(SceneLoadError::MissingField("tank"));
    }

    let pivots = TankPivots {
        turret: turret_pivot.ok_or(SceneLoadError::MissingField("turret_pivot"))?,
        barrel: barrel_pivot.ok_or(SceneLoadError::MissingField("barrel_pivot"))?,
        join: join_pivot.ok_or(SceneLoadError::MissingField("join_pivot"))?,
    };
    let viewport = Viewport::from_size(width as Float, height as Float);
    let view = ViewContext::look_at(&origin, &target, &up,
                                    fov_deg.to_radians(), near_clip, far_clip,
                                    viewport)?;

    Ok(TankScene {
        articulation: Articulation::new(height_offset, pivots),
        state,
        mesh_path,
        view,
    })
}

fn attributes(e: &BytesStart, defaults: &HashMap<String, String>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = resolve_value(&attr.unescape_value().unwrap_or_default(), defaults);
        out.insert(key, value);
    }
    out
}

fn required<'a>(attrs: &'a HashMap<String, String>, key: &'static str) -> Result<&'a str, SceneLoadError> {
    attrs.get(key).map(|s| s.as_str()).ok_or(SceneLoadError::MissingField(key))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
<scene>
    <default name="h" value="0.46"/>
    <tank>
        <float name="height_offset" value="$h"/>
        <point name="turret_pivot" value="0, 0.9, 0"/>
        <point name="barrel_pivot" value="1.8, 1.0, 0"/>
        <point name="join_pivot" value="0.5, 1.0, 0"/>
        <string name="filename" value="tank.obj"/>
        <state>
            <point name="position" value="2, 0, -1"/>
            <float name="rotation" value="0.5"/>
            <float name="turret_rotation" value="-0.25"/>
            <float name="barrel_elevation" value="0.1"/>
        </state>
    </tank>
    <sensor type="perspective">
        <float name="fov" value="60"/>
        <transform name="to_world">
            <lookat origin="0, 4, 10" target="0, 0, 0" up="0, 1, 0"/>
        </transform>
        <film>
            <integer name="width" value="1024"/>
            <integer name="height" value="512"/>
        </film>
    </sensor>
</scene>
"#;

    #[test]
    fn test_parse_full_scene() {
        let scene = parse_scene(SCENE, Path::new("assets")).unwrap();
        assert!((scene.articulation.height_offset - 0.46).abs() < 1e-6);
        assert_eq!(scene.articulation.pivots.barrel, Vector3f::new(1.8, 1.0, 0.0));
        assert_eq!(scene.articulation.pivots.join, Vector3f::new(0.5, 1.0, 0.0));
        assert_eq!(scene.state.position, Vector3f::new(2.0, 0.0, -1.0));
        assert_eq!(scene.state.rotation, 0.5);
        assert_eq!(scene.state.turret_rotation, -0.25);
        assert_eq!(scene.state.barrel_elevation, 0.1);
        assert_eq!(scene.mesh_path, Some(Path::new("assets").join("tank.obj")));
        assert_eq!(scene.view.viewport().width, 1024.0);
        assert_eq!(scene.view.viewport().height, 512.0);
    }

    #[test]
    fn test_defaults_without_sensor() {
        let xml = r#"
<scene>
    <tank>
        <point name="turret_pivot" value="0,0,0"/>
        <point name="barrel_pivot" value="1,0.5,0"/>
        <point name="join_pivot" value="0,0,0"/>
    </tank>
</scene>
"#;
        let scene = parse_scene(xml, Path::new(".")).unwrap();
        assert_eq!(scene.articulation.height_offset, DEFAULT_HEIGHT_OFFSET);
        assert_eq!(scene.state, TankState::default());
        assert!(scene.mesh_path.is_none());
        assert_eq!(scene.view.viewport().width, 800.0);
    }

    #[test]
    fn test_empty_elements_do_not_open_sections() {
        let xml = r#"
<scene>
    <tank>
        <state/>
        <float name="height_offset" value="1.5"/>
        <point name="turret_pivot" value="0,0,0"/>
        <point name="barrel_pivot" value="1,0.5,0"/>
        <point name="join_pivot" value="0,0,0"/>
    </tank>
    <sensor type="perspective"/>
    <float name="fov" value="5"/>
</scene>
"#;
        let scene = parse_scene(xml, Path::new(".")).unwrap();
        assert_eq!(scene.articulation.height_offset, 1.5);
        assert_eq!(scene.articulation.pivots.barrel, Vector3f::new(1.0, 0.5, 0.0));
        assert_eq!(scene.state, TankState::default());
        // the stray fov sits outside any sensor and changes nothing
        let reference = parse_scene(&xml.replace(r#"<float name="fov" value="5"/>"#, ""), Path::new(".")).unwrap();
        assert_eq!(scene.view.projection(), reference.view.projection());
    }

    #[test]
    fn test_missing_pivot() {
        let xml = r#"<scene><tank><point name="turret_pivot" value="0,0,0"/></tank></scene>"#;
        let err = parse_scene(xml, Path::new(".")).unwrap_err();
        assert!(matches!(err, SceneLoadError::MissingField("barrel_pivot")));
    }

    #[test]
    fn test_missing_tank() {
        let err = parse_scene("<scene/>", Path::new(".")).unwrap_err();
        assert!(matches!(err, SceneLoadError::MissingField("tank")));
    }

    #[test]
    fn test_bad_float() {
        let xml = r#"<scene><tank><float name="height_offset" value="tall"/></tank></scene>"#;
        assert!(matches!(parse_scene(xml, Path::new(".")), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn test_degenerate_camera_is_rejected() {
        let xml = r#"
<scene>
    <tank>
        <point name="turret_pivot" value="0,0,0"/>
        <point name="barrel_pivot" value="1,0.5,0"/>
        <point name="join_pivot" value="0,0,0"/>
    </tank>
    <sensor>
        <float name="near_clip" value="1"/>
        <float name="far_clip" value="1"/>
    </sensor>
</scene>
"#;
        let err = parse_scene(xml, Path::new(".")).unwrap_err();
        assert!(matches!(err, SceneLoadError::Invalid(TurretError::SingularTransform)));
    }
}
