//!
//! # The Component Cell Model
//!

// Std-Lib Imports
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

// Crates.io
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

// Workspace Imports
use phot21utils::{Ptr, SerializationFormat};

// Local Imports
use crate::error::{PhotError, PhotResult};
use crate::geom::{Label, Point, Polygon, Transform};
use crate::port::Port;

/// # Generator Settings
/// Record of the generator call that produced a component,
/// serialized into metadata snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Generator function name
    pub function: String,
    /// Generator parameters
    pub params: Value,
}

/// # Component Reference
/// A placed instance of a shared component cell
#[derive(Debug, Clone)]
pub struct Reference {
    /// Instantiated cell
    pub cell: Ptr<Component>,
    /// Placement
    pub trans: Transform,
}
impl Reference {
    /// Create a reference to `cell`, placed at the origin
    pub fn new(cell: Ptr<Component>) -> Self {
        Self {
            cell,
            trans: Transform::default(),
        }
    }
    /// Move to `origin`
    pub fn at(&mut self, origin: Point) -> &mut Self {
        self.trans.origin = origin;
        self
    }
    /// Add counter-clockwise rotation of `degrees`
    pub fn rotate(&mut self, degrees: i16) -> PhotResult<&mut Self> {
        self.trans = Transform::new(
            self.trans.origin,
            self.trans.rotation + degrees,
            self.trans.reflect,
        )?;
        Ok(self)
    }
    /// Toggle reflection about the x-axis
    pub fn reflect(&mut self) -> &mut Self {
        self.trans.reflect = !self.trans.reflect;
        self
    }
    /// Get the referenced cell's name
    pub fn cell_name(&self) -> PhotResult<String> {
        Ok(self.cell.read()?.name.clone())
    }
    /// Get the child's port `name`, mapped into parent coordinates
    pub fn port(&self, name: &str) -> PhotResult<Port> {
        let cell = self.cell.read()?;
        Ok(cell.port(name)?.transformed(&self.trans))
    }
    /// Translate so that the child's port `port_name` lands on `dest`.
    /// Rotation and reflection are left as already configured; set them
    /// before connecting.
    pub fn connect(&mut self, port_name: &str, dest: &Port) -> PhotResult<&mut Self> {
        let unplaced = Transform {
            origin: Point::default(),
            rotation: self.trans.rotation,
            reflect: self.trans.reflect,
        };
        let mapped = {
            let cell = self.cell.read()?;
            cell.port(port_name)?.transformed(&unplaced)
        };
        self.trans.origin = Point::new(
            dest.center.x - mapped.center.x,
            dest.center.y - mapped.center.y,
        );
        Ok(self)
    }
}

/// # Component
///
/// A layout cell: polygons, labels, named ports, and references to child
/// components. Children are shared [Ptr]s; a cell instantiated twice is
/// stored once.
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// Component (cell) name
    pub name: String,
    /// Filled polygons
    pub polygons: Vec<Polygon>,
    /// Text labels
    pub labels: Vec<Label>,
    /// Placed child instances
    pub refs: Vec<Reference>,
    /// Named ports, keyed (and iterated) by name
    pub ports: BTreeMap<String, Port>,
    /// Generator settings, if generator-produced
    pub settings: Option<Settings>,
    /// Imported metadata snapshot, if loaded from a sidecar
    pub meta: Option<Value>,
}
impl Component {
    /// Create a new and empty [Component]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Place child `cell` at the origin, returning a handle for placement
    pub fn add(&mut self, cell: Ptr<Component>) -> &mut Reference {
        self.refs.push(Reference::new(cell));
        // Note the vector is never empty here, having just been pushed onto
        self.refs.last_mut().unwrap()
    }
    /// Add [Port] `port`. Errors if a port of the same name exists.
    pub fn add_port(&mut self, port: Port) -> PhotResult<()> {
        if self.ports.contains_key(&port.name) {
            return Err(PhotError::Str(format!(
                "duplicate port {} on component {}",
                port.name, self.name
            )));
        }
        self.ports.insert(port.name.clone(), port);
        Ok(())
    }
    /// Get port `name`
    pub fn port(&self, name: &str) -> PhotResult<&Port> {
        self.ports.get(name).ok_or_else(|| {
            PhotError::Str(format!("no port {} on component {}", name, self.name))
        })
    }

    /// Digest the flattened polygon geometry.
    ///
    /// Every polygon, including those of transitively referenced children,
    /// is mapped to top-level coordinates and byte-encoded as its layer,
    /// datatype, and point list, all big-endian. The per-polygon encodings
    /// are sorted before digesting, so the hash is independent of element
    /// and instance ordering, and in particular invariant under a GDS
    /// write/read round-trip.
    pub fn hash_geometry(&self) -> PhotResult<String> {
        let mut encoded: Vec<Vec<u8>> = Vec::new();
        self.encode_polygons(&Transform::default(), &mut encoded)?;
        encoded.sort();
        let mut hasher = Sha256::new();
        for bytes in encoded.iter() {
            hasher.update(bytes);
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(2 * digest.len());
        for byte in digest.iter() {
            // Infallible for String destinations
            let _ = write!(hex, "{:02x}", byte);
        }
        Ok(hex)
    }
    /// Recursively encode polygons into `out`, transformed by `trans`
    fn encode_polygons(&self, trans: &Transform, out: &mut Vec<Vec<u8>>) -> PhotResult<()> {
        for poly in self.polygons.iter() {
            let mut bytes = Vec::with_capacity(4 + 16 * poly.points.len());
            bytes.extend_from_slice(&poly.layer.layer.to_be_bytes());
            bytes.extend_from_slice(&poly.layer.datatype.to_be_bytes());
            for pt in poly.points.iter() {
                let p = trans.apply(*pt);
                bytes.extend_from_slice(&p.x.to_be_bytes());
                bytes.extend_from_slice(&p.y.to_be_bytes());
            }
            out.push(bytes);
        }
        for r in self.refs.iter() {
            let child = r.cell.read()?;
            child.encode_polygons(&trans.compose(&r.trans), out)?;
        }
        Ok(())
    }

    /// Structural snapshot of the component hierarchy.
    ///
    /// Returns the component's name, settings, ports, and instances, plus a
    /// flat `cells` map holding the snapshot of every descendant cell.
    /// A component carrying imported metadata instead reports that metadata,
    /// with the `name` entry replaced by its own name.
    pub fn to_dict(&self) -> PhotResult<Value> {
        if let Some(meta) = &self.meta {
            let mut dict = meta.clone();
            if let Value::Object(map) = &mut dict {
                map.insert("name".to_string(), json!(self.name));
            }
            return Ok(dict);
        }
        let mut dict = self.snapshot()?;
        let mut cells = serde_json::Map::new();
        self.collect_cells(&mut cells)?;
        if let Value::Object(map) = &mut dict {
            map.insert("cells".to_string(), Value::Object(cells));
        }
        Ok(dict)
    }
    /// Single-cell snapshot, without descendants
    fn snapshot(&self) -> PhotResult<Value> {
        let ports: BTreeMap<&String, Value> = self
            .ports
            .iter()
            .map(|(name, p)| {
                (
                    name,
                    json!({
                        "center": [p.center.x, p.center.y],
                        "width": p.width,
                        "orientation": p.orientation,
                        "layer": [p.layer.layer, p.layer.datatype],
                    }),
                )
            })
            .collect();
        let mut instances = Vec::with_capacity(self.refs.len());
        for r in self.refs.iter() {
            instances.push(json!({
                "cell": r.cell_name()?,
                "origin": [r.trans.origin.x, r.trans.origin.y],
                "rotation": r.trans.rotation,
                "reflect": r.trans.reflect,
            }));
        }
        Ok(json!({
            "name": self.name,
            "settings": self.settings,
            "ports": ports,
            "instances": instances,
        }))
    }
    /// Insert the snapshot of every descendant cell into `cells`, by name
    fn collect_cells(&self, cells: &mut serde_json::Map<String, Value>) -> PhotResult<()> {
        for r in self.refs.iter() {
            let child = r.cell.read()?;
            if !cells.contains_key(&child.name) {
                cells.insert(child.name.clone(), child.snapshot()?);
                child.collect_cells(cells)?;
            }
        }
        Ok(())
    }

    /// Export to a GDSII file at `path`
    pub fn write_gds(&self, path: impl AsRef<Path>) -> PhotResult<()> {
        let gdslib = crate::gds::to_gds(self)?;
        gdslib.save(path)?;
        Ok(())
    }
    /// Export to a GDSII file at `path`, alongside a YAML metadata sidecar
    /// (`<stem>.yml`) holding [Component::to_dict]
    pub fn write_gds_with_metadata(&self, path: impl AsRef<Path>) -> PhotResult<()> {
        let path = path.as_ref();
        self.write_gds(path)?;
        let dict = self.to_dict()?;
        SerializationFormat::Yaml.save(&dict, path.with_extension("yml"))?;
        Ok(())
    }
}
