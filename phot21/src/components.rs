//!
//! # Component Generators
//!
//! Geometry construction for the built-in component set. These functions
//! build raw [Component]s; callers generally reach them through [Factory],
//! which adds caching.
//!
//! [Factory]: crate::factory::Factory
//!

// Crates.io
use serde_json::json;

// Workspace Imports
use phot21utils::Ptr;

// Local Imports
use crate::component::{Component, Settings};
use crate::error::PhotResult;
use crate::geom::{LayerSpec, Point, Polygon};
use crate::port::Port;
use crate::xsection::CrossSection;

// MMI dimensions, in database units (nm)
const MMI_TAPER_WIDTH: i64 = 1_000;
const MMI_TAPER_LENGTH: i64 = 10_000;
const MMI_BODY_LENGTH: i64 = 5_500;
const MMI_BODY_WIDTH: i64 = 2_500;
const MMI_GAP: i64 = 250;

/// Arm length of the Mach-Zehnder interferometer, in database units
pub(crate) const MZI_ARM_LENGTH: i64 = 10_000;

/// # Straight Waveguide
/// A `length`-long rectangle of the cross-section's width, with input and
/// output ports at its two ends.
pub fn straight(length: i64, xs: &CrossSection) -> PhotResult<Component> {
    let mut c = Component::new(format!("straight_length{}_{}", length, xs.name));
    let w = xs.width;
    c.polygons
        .push(Polygon::rect(xs.layer, 0, -w / 2, length, w / 2));
    c.add_port(Port::new(
        xs.port_in.clone(),
        Point::new(0, 0),
        w,
        180,
        xs.layer,
    ))?;
    c.add_port(Port::new(
        xs.port_out.clone(),
        Point::new(length, 0),
        w,
        0,
        xs.layer,
    ))?;
    c.settings = Some(Settings {
        function: "straight".into(),
        params: json!({ "length": length, "cross_section": xs.name }),
    });
    Ok(c)
}

/// # 1x2 Multimode Interferometer
///
/// An input taper, the wide MMI body, and two output tapers.
/// Ports: `o1` in, `o2` (upper) and `o3` (lower) out.
pub fn mmi1x2(xs: &CrossSection) -> PhotResult<Component> {
    let mut c = Component::new(format!("mmi1x2_{}", xs.name));
    let layer = xs.layer;
    let x_body = MMI_TAPER_LENGTH;
    let x_out_taper = MMI_TAPER_LENGTH + MMI_BODY_LENGTH;
    let x_end = x_out_taper + MMI_TAPER_LENGTH;
    // The two output waveguides are centered about the MMI gap
    let y_out = (MMI_GAP + MMI_TAPER_WIDTH) / 2;

    // Input taper, the body, and the two output tapers
    c.polygons
        .push(taper(layer, 0, x_body, xs.width, MMI_TAPER_WIDTH, 0));
    c.polygons.push(Polygon::rect(
        layer,
        x_body,
        -MMI_BODY_WIDTH / 2,
        x_out_taper,
        MMI_BODY_WIDTH / 2,
    ));
    c.polygons.push(taper(
        layer,
        x_out_taper,
        x_end,
        MMI_TAPER_WIDTH,
        xs.width,
        y_out,
    ));
    c.polygons.push(taper(
        layer,
        x_out_taper,
        x_end,
        MMI_TAPER_WIDTH,
        xs.width,
        -y_out,
    ));

    c.add_port(Port::new("o1", Point::new(0, 0), xs.width, 180, layer))?;
    c.add_port(Port::new("o2", Point::new(x_end, y_out), xs.width, 0, layer))?;
    c.add_port(Port::new("o3", Point::new(x_end, -y_out), xs.width, 0, layer))?;
    c.settings = Some(Settings {
        function: "mmi1x2".into(),
        params: json!({ "cross_section": xs.name }),
    });
    Ok(c)
}

/// # Mach-Zehnder Interferometer
///
/// The `splitter` cell at the input, two straight `arm` cells, and the same
/// splitter rotated 180 degrees recombining at the output. The splitter is
/// expected to expose ports `o1` (in) and `o2`/`o3` (out); the arms use the
/// cross-section's port names.
pub fn mzi(
    splitter: &Ptr<Component>,
    arm: &Ptr<Component>,
    xs: &CrossSection,
) -> PhotResult<Component> {
    let splitter_name = splitter.read()?.name.clone();
    let mut c = Component::new(format!("mzi_{}_{}", splitter_name, xs.name));

    let (split_in, split_o2, split_o3) = {
        let r = c.add(splitter.clone());
        (r.port("o1")?, r.port("o2")?, r.port("o3")?)
    };
    let arm_top_out = {
        let r = c.add(arm.clone());
        r.connect(&xs.port_in, &split_o2)?;
        r.port(&xs.port_out)?
    };
    let arm_bot_out = {
        let r = c.add(arm.clone());
        r.connect(&xs.port_in, &split_o3)?;
        r.port(&xs.port_out)?
    };
    // Recombine: the rotated splitter's `o2` meets the lower arm,
    // which lands its `o3` on the upper arm
    let combine_out = {
        let r = c.add(splitter.clone());
        r.rotate(180)?;
        r.connect("o2", &arm_bot_out)?;
        debug_assert_eq!(r.port("o3")?.center, arm_top_out.center);
        r.port("o1")?
    };

    let mut o1 = split_in;
    o1.name = "o1".into();
    c.add_port(o1)?;
    let mut o2 = combine_out;
    o2.name = "o2".into();
    c.add_port(o2)?;
    c.settings = Some(Settings {
        function: "mzi".into(),
        params: json!({ "splitter": splitter_name, "cross_section": xs.name }),
    });
    Ok(c)
}

/// Linear taper from width `w0` at `x0` to `w1` at `x1`, centered at `y` on `layer`
fn taper(layer: LayerSpec, x0: i64, x1: i64, w0: i64, w1: i64, y: i64) -> Polygon {
    Polygon {
        layer,
        points: vec![
            Point::new(x0, y - w0 / 2),
            Point::new(x1, y - w1 / 2),
            Point::new(x1, y + w1 / 2),
            Point::new(x0, y + w0 / 2),
        ],
    }
}
