#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod line;

use std::fmt;

use geom::{Point3, TubeError, TubeOptions};
use line::{LineNode, RemovePolicy};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    log::set_logger(&DEFAULT_LOGGER).expect("error initializing logger");
    log::set_max_level(LevelFilter::Debug);
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Geometry handed to the JS renderer in one object.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryExport<'a> {
    pub vertices: &'a [[f64; 3]],
    pub normals: &'a [[f64; 3]],
    pub uvs: &'a [[f64; 2]],
    pub indices: &'a [u32],
    pub length: f64,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

/// Tube line exposed to JS.
#[wasm_bindgen]
pub struct TubeEngine {
    node: LineNode,
}

#[wasm_bindgen]
impl TubeEngine {
    /// Accepts a partial options object (`{ radius, edges, maxTurnSteps, ... }`)
    /// or `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<TubeEngine, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            TubeOptions::default()
        } else {
            serde_wasm_bindgen::from_value::<TubeOptions>(options).map_err(to_js_error)?
        };
        Self::with_options(options).map_err(to_js_error)
    }

    /// Appends a point. Returns `false` when it was ignored as degenerate.
    #[wasm_bindgen]
    pub fn add_point(&mut self, x: f64, y: f64, z: f64) -> bool {
        self.node.add(Point3::new(x, y, z), None)
    }

    /// Replaces the point list with packed `[x0, y0, z0, x1, ...]` coordinates.
    #[wasm_bindgen]
    pub fn set_points(&mut self, flat: &[f64]) -> Result<(), JsValue> {
        let points = points_from_flat(flat).map_err(|err| js_error(&err))?;
        self.node.set_points(&points);
        debug_log!("set_points: {} accepted of {}", self.node.points().len(), points.len());
        Ok(())
    }

    /// Removes up to `count` points from the end. Returns how many went.
    #[wasm_bindgen]
    pub fn remove_points(&mut self, count: u32) -> u32 {
        let removed = self.node.remove(count as usize);
        u32::try_from(removed).unwrap_or(u32::MAX)
    }

    /// Clears the line whenever a removal hits a line shorter than `points`.
    /// `0` makes removals exact.
    #[wasm_bindgen]
    pub fn set_full_clear_below(&mut self, points: u32) {
        self.node
            .set_remove_policy(RemovePolicy::full_clear_below(points as usize));
    }

    #[wasm_bindgen]
    pub fn set_radius(&mut self, radius: f64) -> Result<(), JsValue> {
        self.node.set_radius(radius).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_edges(&mut self, edges: u32) -> Result<(), JsValue> {
        self.node.set_edges(edges as usize).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_max_turning(&mut self, max_turn_steps: u32) -> Result<(), JsValue> {
        self.node
            .set_max_turning(max_turn_steps as usize)
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f32> {
        self.node.snapshot().positions_f32()
    }

    #[wasm_bindgen]
    pub fn normals(&self) -> Vec<f32> {
        self.node.snapshot().normals_f32()
    }

    #[wasm_bindgen]
    pub fn uvs(&self) -> Vec<f32> {
        self.node.snapshot().uvs_f32()
    }

    #[wasm_bindgen]
    pub fn indices(&self) -> Vec<u32> {
        self.node.snapshot().indices.clone()
    }

    /// Total arc length of the tube axis.
    #[wasm_bindgen]
    pub fn length(&self) -> f64 {
        self.node.length()
    }

    #[wasm_bindgen]
    pub fn point_count(&self) -> u32 {
        u32::try_from(self.node.points().len()).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen]
    pub fn get_geometry(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.geometry()).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn diagnostics_summary(&self) -> String {
        self.node.diagnostics().summary()
    }
}

impl TubeEngine {
    /// Native constructor; the JS constructor parses its options and ends here.
    pub fn with_options(options: TubeOptions) -> Result<TubeEngine, TubeError> {
        Ok(Self {
            node: LineNode::new(&[], options)?,
        })
    }

    #[must_use]
    pub fn geometry(&self) -> GeometryExport<'_> {
        let snapshot = self.node.snapshot();
        GeometryExport {
            vertices: &snapshot.vertices,
            normals: &snapshot.normals,
            uvs: &snapshot.uvs,
            indices: &snapshot.indices,
            length: snapshot.arc_length,
            vertex_count: snapshot.vertex_count(),
            triangle_count: snapshot.triangle_count(),
        }
    }

    #[must_use]
    pub fn node(&self) -> &LineNode {
        &self.node
    }
}

fn points_from_flat(flat: &[f64]) -> Result<Vec<Point3>, String> {
    if flat.len() % 3 != 0 {
        return Err(format!(
            "point buffer length {} is not a multiple of 3",
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_points_must_be_triples() {
        assert_eq!(points_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().len(), 2);
        assert!(points_from_flat(&[0.0, 1.0]).is_err());
        assert!(points_from_flat(&[]).unwrap().is_empty());
    }

    #[test]
    fn oversized_max_turning_is_rejected() {
        let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
        engine.set_points(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 5.0, 5.0, 0.0]).unwrap();
        let vertex_count = engine.geometry().vertex_count;

        assert!(engine.set_max_turning(4_000_000_000).is_err());
        assert_eq!(engine.node().options().max_turn_steps, 4);
        assert_eq!(engine.geometry().vertex_count, vertex_count);
    }

    #[test]
    fn geometry_export_mirrors_snapshot() {
        let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
        engine.add_point(0.0, 0.0, 0.0);
        engine.add_point(0.0, 0.0, 10.0);

        let geometry = engine.geometry();
        assert_eq!(geometry.vertex_count, 24);
        assert_eq!(geometry.triangle_count, 24);
        assert_eq!(geometry.indices.len(), 72);
        assert!((geometry.length - 10.0).abs() < 1e-12);
    }
}
