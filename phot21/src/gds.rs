//!
//! # GDSII Conversion
//!
//! Converts between [Component] hierarchies and [phot21gds] libraries,
//! in both directions.
//!

// Std-Lib Imports
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

// Crates.io
use log::{debug, warn};
use sha2::{Digest, Sha256};

// Workspace Imports
use phot21gds::{
    GdsArrayRef, GdsBoundary, GdsElement, GdsLibrary, GdsPoint, GdsStrans, GdsStruct,
    GdsStructRef, GdsTextElem,
};
use phot21utils::{DepOrder, DepOrderer, Ptr, SerializationFormat};

// Local Imports
use crate::component::{Component, Reference};
use crate::error::{ErrorContext, HasErrors, PhotError, PhotResult};
use crate::geom::{Label, LayerSpec, Point, Polygon, Transform};

/// Export `top` and its cell hierarchy to a [GdsLibrary]
pub fn to_gds(top: &Component) -> PhotResult<GdsLibrary> {
    GdsExporter::export(top)
}

/// Import the GDSII file at `path`, returning its top cell
pub fn import_gds(path: impl AsRef<Path>, opts: &ImportOptions) -> PhotResult<Ptr<Component>> {
    let path = path.as_ref();
    let lib = GdsLibrary::open(path)?;
    GdsImporter::import(&lib, path, opts)
}

/// # Import Options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Load the YAML metadata sidecar, if present
    pub read_metadata: bool,
    /// Suffix imported cell names with a digest of the source path,
    /// keeping them distinct from generator-produced cells
    pub unique_names: bool,
}
impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            read_metadata: false,
            unique_names: true,
        }
    }
}

/// Dependency-ordering of shared cells: a cell comes after
/// every cell it references
struct CellDepOrder;
impl DepOrder for CellDepOrder {
    type Item = Ptr<Component>;
    type Error = PhotError;
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> PhotResult<()> {
        let cell = item.read()?;
        for r in cell.refs.iter() {
            orderer.push(&r.cell)?;
        }
        Ok(())
    }
    fn fail() -> PhotResult<()> {
        Err(PhotError::Export {
            message: "dependency cycle among cells".into(),
            stack: Vec::new(),
        })
    }
}

/// # Gds Exporter
///
/// Converts a [Component] hierarchy to a [GdsLibrary]: cells are emitted
/// bottom-up in dependency order, and every *distinct* cell gets a unique
/// struct name. When two distinct cells carry the same name, later ones
/// are renamed with a `$<n>` suffix.
pub struct GdsExporter {
    /// Number of cells seen per base-name
    names: HashMap<String, usize>,
    /// Assigned struct name per cell
    assigned: HashMap<Ptr<Component>, String>,
    /// Error context stack
    ctx_stack: Vec<ErrorContext>,
}
impl GdsExporter {
    /// Export `top` to a [GdsLibrary]
    pub fn export(top: &Component) -> PhotResult<GdsLibrary> {
        let mut this = Self {
            names: HashMap::new(),
            assigned: HashMap::new(),
            ctx_stack: vec![ErrorContext::Library],
        };
        this.export_lib(top)
    }
    fn export_lib(&mut self, top: &Component) -> PhotResult<GdsLibrary> {
        // Dependency-order the referenced cells, children before parents
        let children: Vec<Ptr<Component>> = top.refs.iter().map(|r| r.cell.clone()).collect();
        let ordered = CellDepOrder::order(&children)?;
        // Units: nanometer database unit, micrometer user unit
        let mut lib = GdsLibrary::new(top.name.clone());
        for ptr in ordered.iter() {
            let cell = ptr.read()?;
            let name = self.assign_name(&cell.name);
            self.assigned.insert(ptr.clone(), name.clone());
            lib.structs.push(self.export_cell(&cell, name)?);
        }
        // And the top cell last
        let top_name = self.assign_name(&top.name);
        lib.structs.push(self.export_cell(top, top_name)?);
        Ok(lib)
    }
    /// Produce a unique struct name from base-name `base`
    fn assign_name(&mut self, base: &str) -> String {
        let count = self.names.entry(base.to_string()).or_insert(0);
        let name = if *count == 0 {
            base.to_string()
        } else {
            let renamed = format!("{}${}", base, *count);
            warn!("renaming duplicate cell {} to {}", base, renamed);
            renamed
        };
        *count += 1;
        name
    }
    /// Convert `cell` to a [GdsStruct] named `name`
    fn export_cell(&mut self, cell: &Component, name: String) -> PhotResult<GdsStruct> {
        self.ctx_stack.push(ErrorContext::Cell(cell.name.clone()));
        let mut strukt = GdsStruct::new(name);
        for poly in cell.polygons.iter() {
            strukt.elems.push(self.export_polygon(poly)?);
        }
        for label in cell.labels.iter() {
            strukt.elems.push(self.export_label(label)?);
        }
        for r in cell.refs.iter() {
            strukt.elems.push(self.export_ref(r)?);
        }
        self.ctx_stack.pop();
        Ok(strukt)
    }
    /// Convert to a closed BOUNDARY element
    fn export_polygon(&mut self, poly: &Polygon) -> PhotResult<GdsElement> {
        self.ctx_stack.push(ErrorContext::Geometry);
        let mut xy = Vec::with_capacity(poly.points.len() + 1);
        for pt in poly.points.iter() {
            xy.push(self.export_point(pt)?);
        }
        // Repeat the first point, closing the polygon
        if let Some(first) = xy.first().cloned() {
            xy.push(first);
        }
        self.ctx_stack.pop();
        Ok(GdsBoundary {
            layer: poly.layer.layer,
            datatype: poly.layer.datatype,
            xy,
            ..Default::default()
        }
        .into())
    }
    /// Convert to a TEXT element
    fn export_label(&mut self, label: &Label) -> PhotResult<GdsElement> {
        Ok(GdsTextElem {
            string: label.text.clone(),
            layer: label.layer.layer,
            texttype: label.layer.datatype,
            xy: self.export_point(&label.origin)?,
            ..Default::default()
        }
        .into())
    }
    /// Convert to an SREF element
    fn export_ref(&mut self, r: &Reference) -> PhotResult<GdsElement> {
        let name = match self.assigned.get(&r.cell) {
            Some(name) => name.clone(),
            // Unreachable through [GdsExporter::export]: dependency
            // ordering assigns every referenced cell a name first
            None => return self.fail("reference to an unexported cell"),
        };
        self.ctx_stack.push(ErrorContext::Instance(name.clone()));
        let strans = if r.trans.rotation != 0 || r.trans.reflect {
            Some(GdsStrans {
                reflected: r.trans.reflect,
                angle: if r.trans.rotation != 0 {
                    Some(r.trans.rotation as f64)
                } else {
                    None
                },
                ..Default::default()
            })
        } else {
            None
        };
        let xy = self.export_point(&r.trans.origin)?;
        self.ctx_stack.pop();
        Ok(GdsStructRef {
            name,
            xy,
            strans,
            ..Default::default()
        }
        .into())
    }
    /// Convert `pt` to GDSII's 32-bit coordinates
    fn export_point(&mut self, pt: &Point) -> PhotResult<GdsPoint> {
        let x = self.export_coord(pt.x)?;
        let y = self.export_coord(pt.y)?;
        Ok(GdsPoint::new(x, y))
    }
    fn export_coord(&mut self, val: i64) -> PhotResult<i32> {
        i32::try_from(val).map_err(|_| self.err(format!("coordinate {} out of GDS range", val)))
    }
}
impl HasErrors for GdsExporter {
    fn err(&self, msg: impl Into<String>) -> PhotError {
        PhotError::Export {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        }
    }
}

/// # Gds Importer
///
/// Builds a [Component] hierarchy from a parsed [GdsLibrary] in two passes:
/// first allocating a shared cell per struct, then populating elements,
/// resolving SREF/AREF references by name. The unique unreferenced struct
/// becomes the returned top cell.
pub struct GdsImporter<'a> {
    /// Source file path, for name suffixes and the metadata sidecar
    path: &'a Path,
    opts: &'a ImportOptions,
    /// Imported cells, keyed by *original* struct name
    cells: HashMap<String, Ptr<Component>>,
    /// Error context stack
    ctx_stack: Vec<ErrorContext>,
}
impl<'a> GdsImporter<'a> {
    /// Import `lib`, sourced from `path`, returning its top cell
    pub fn import(
        lib: &GdsLibrary,
        path: &'a Path,
        opts: &'a ImportOptions,
    ) -> PhotResult<Ptr<Component>> {
        let mut this = Self {
            path,
            opts,
            cells: HashMap::new(),
            ctx_stack: vec![ErrorContext::Library],
        };
        this.import_lib(lib)
    }
    fn import_lib(&mut self, lib: &GdsLibrary) -> PhotResult<Ptr<Component>> {
        self.check_units(lib)?;
        // Optional path-digest suffix keeping imported names
        // distinct from generated ones
        let suffix = if self.opts.unique_names {
            format!("_{}", path_digest(self.path))
        } else {
            String::new()
        };
        // First pass: allocate a shared cell per struct
        for strukt in lib.structs.iter() {
            if self.cells.contains_key(&strukt.name) {
                return self.fail(format!("duplicate cell name {}", strukt.name));
            }
            let cell = Component::new(format!("{}{}", strukt.name, suffix));
            self.cells.insert(strukt.name.clone(), Ptr::new(cell));
        }
        // Second pass: populate elements, resolving references by name
        for strukt in lib.structs.iter() {
            self.import_struct(strukt)?;
        }
        debug!(
            "imported {} cells from {}",
            lib.structs.len(),
            self.path.display()
        );
        let top = self.find_top(lib)?;
        if self.opts.read_metadata {
            self.read_metadata(&top)?;
        }
        Ok(top)
    }
    /// Require the nanometer database unit all phot21 data is denoted in
    fn check_units(&mut self, lib: &GdsLibrary) -> PhotResult<()> {
        self.ctx_stack.push(ErrorContext::Units);
        let db_unit = lib.units.db_unit();
        if (db_unit - 1e-9).abs() > 1e-21 {
            return self.fail(format!("unsupported database unit {} meters", db_unit));
        }
        self.ctx_stack.pop();
        Ok(())
    }
    /// Populate the cell for `strukt` from its elements
    fn import_struct(&mut self, strukt: &GdsStruct) -> PhotResult<()> {
        self.ctx_stack.push(ErrorContext::Cell(strukt.name.clone()));
        let ptr = match self.cells.get(&strukt.name) {
            Some(ptr) => ptr.clone(),
            None => return self.fail("unallocated cell"),
        };
        let mut cell = ptr.write()?;
        for elem in strukt.elems.iter() {
            match elem {
                GdsElement::GdsBoundary(b) => cell.polygons.push(self.import_boundary(b)?),
                GdsElement::GdsTextElem(t) => cell.labels.push(import_text(t)),
                GdsElement::GdsStructRef(sref) => {
                    let r = self.import_sref(sref)?;
                    cell.refs.push(r);
                }
                GdsElement::GdsArrayRef(aref) => {
                    let refs = self.import_aref(aref)?;
                    cell.refs.extend(refs);
                }
                GdsElement::GdsPath(_) => {
                    return self.fail("PATH elements are not supported on import")
                }
            }
        }
        self.ctx_stack.pop();
        Ok(())
    }
    /// Convert a closed BOUNDARY to an open [Polygon]
    fn import_boundary(&mut self, b: &GdsBoundary) -> PhotResult<Polygon> {
        self.ctx_stack.push(ErrorContext::Geometry);
        let mut points: Vec<Point> = b
            .xy
            .iter()
            .map(|p| Point::new(p.x.into(), p.y.into()))
            .collect();
        // Drop the repeated closing point
        if points.len() >= 2 && points.first() == points.last() {
            points.pop();
        }
        self.ctx_stack.pop();
        Ok(Polygon {
            layer: LayerSpec::new(b.layer, b.datatype),
            points,
        })
    }
    /// Convert an SREF to a [Reference]
    fn import_sref(&mut self, sref: &GdsStructRef) -> PhotResult<Reference> {
        self.ctx_stack.push(ErrorContext::Instance(sref.name.clone()));
        let cell = self.resolve(&sref.name)?;
        let (rotation, reflect) = self.import_strans(sref.strans.as_ref())?;
        let origin = Point::new(sref.xy.x.into(), sref.xy.y.into());
        self.ctx_stack.pop();
        Ok(Reference {
            cell,
            trans: Transform::new(origin, rotation, reflect)?,
        })
    }
    /// Expand an AREF to its rows x cols [Reference]s
    fn import_aref(&mut self, aref: &GdsArrayRef) -> PhotResult<Vec<Reference>> {
        self.ctx_stack.push(ErrorContext::Array(aref.name.clone()));
        let cell = self.resolve(&aref.name)?;
        let (rotation, reflect) = self.import_strans(aref.strans.as_ref())?;
        let cols = i64::from(aref.cols);
        let rows = i64::from(aref.rows);
        if cols <= 0 || rows <= 0 {
            return self.fail("invalid array dimensions");
        }
        let p0 = Point::new(aref.xy[0].x.into(), aref.xy[0].y.into());
        let pcol = Point::new(aref.xy[1].x.into(), aref.xy[1].y.into());
        let prow = Point::new(aref.xy[2].x.into(), aref.xy[2].y.into());
        // Per-instance steps along the column and row spanning vectors
        let col_step = Point::new((pcol.x - p0.x) / cols, (pcol.y - p0.y) / cols);
        let row_step = Point::new((prow.x - p0.x) / rows, (prow.y - p0.y) / rows);
        let mut refs = Vec::with_capacity((cols * rows) as usize);
        for i in 0..cols {
            for j in 0..rows {
                let origin = Point::new(
                    p0.x + i * col_step.x + j * row_step.x,
                    p0.y + i * col_step.y + j * row_step.y,
                );
                refs.push(Reference {
                    cell: cell.clone(),
                    trans: Transform::new(origin, rotation, reflect)?,
                });
            }
        }
        self.ctx_stack.pop();
        Ok(refs)
    }
    /// Decode optional STRANS settings to (rotation, reflect)
    fn import_strans(&mut self, strans: Option<&GdsStrans>) -> PhotResult<(i16, bool)> {
        let strans = match strans {
            None => return Ok((0, false)),
            Some(s) => s,
        };
        if strans.abs_mag || strans.abs_angle {
            return self.fail("absolute magnification and angle are not supported");
        }
        if let Some(mag) = strans.mag {
            if (mag - 1.0).abs() > 1e-9 {
                return self.fail(format!("unsupported magnification {}", mag));
            }
        }
        let rotation = match strans.angle {
            None => 0,
            Some(angle) => {
                let rounded = angle.round();
                if (angle - rounded).abs() > 1e-6 || rounded as i64 % 90 != 0 {
                    return self.fail(format!("unsupported rotation angle {}", angle));
                }
                (rounded as i64).rem_euclid(360) as i16
            }
        };
        Ok((rotation, strans.reflected))
    }
    /// Resolve struct-name `name` to its shared cell
    fn resolve(&mut self, name: &str) -> PhotResult<Ptr<Component>> {
        match self.cells.get(name) {
            Some(ptr) => Ok(ptr.clone()),
            None => self.fail(format!("reference to undefined cell {}", name)),
        }
    }
    /// Find the unique top cell: the struct no other struct references
    fn find_top(&mut self, lib: &GdsLibrary) -> PhotResult<Ptr<Component>> {
        let mut referenced: HashSet<&str> = HashSet::new();
        for strukt in lib.structs.iter() {
            for elem in strukt.elems.iter() {
                match elem {
                    GdsElement::GdsStructRef(sref) => {
                        referenced.insert(&sref.name);
                    }
                    GdsElement::GdsArrayRef(aref) => {
                        referenced.insert(&aref.name);
                    }
                    _ => (),
                }
            }
        }
        let mut tops = lib
            .structs
            .iter()
            .filter(|s| !referenced.contains(s.name.as_str()));
        let top = match tops.next() {
            Some(t) => t,
            None => return self.fail("no top cell: all cells are referenced"),
        };
        if let Some(other) = tops.next() {
            return self.fail(format!(
                "multiple top cells: {} and {}",
                top.name, other.name
            ));
        }
        self.resolve(&top.name)
    }
    /// Attach the YAML sidecar's contents, if present, as `top`'s metadata
    fn read_metadata(&mut self, top: &Ptr<Component>) -> PhotResult<()> {
        self.ctx_stack.push(ErrorContext::Metadata);
        let sidecar = self.path.with_extension("yml");
        if !sidecar.exists() {
            warn!("no metadata sidecar at {}", sidecar.display());
            self.ctx_stack.pop();
            return Ok(());
        }
        let meta: serde_json::Value = SerializationFormat::Yaml.open(&sidecar)?;
        top.write()?.meta = Some(meta);
        self.ctx_stack.pop();
        Ok(())
    }
}
impl<'a> HasErrors for GdsImporter<'a> {
    fn err(&self, msg: impl Into<String>) -> PhotError {
        PhotError::Import {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        }
    }
}

/// Convert a TEXT element to a [Label]
fn import_text(t: &GdsTextElem) -> Label {
    Label {
        text: t.string.clone(),
        origin: Point::new(t.xy.x.into(), t.xy.y.into()),
        layer: LayerSpec::new(t.layer, t.texttype),
    }
}

/// Short hex digest of `path`, for unique imported-cell names
fn path_digest(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
