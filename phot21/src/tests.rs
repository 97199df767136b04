// Workspace Imports
use phot21gds::GdsElement;
use phot21utils::Ptr;

// Local Imports
use crate::component::Component;
use crate::error::PhotResult;
use crate::factory::Factory;
use crate::gds;
use crate::geom::{LayerSpec, Point, Polygon, Transform};
use crate::port::Port;
use crate::xsection::{CrossSection, CrossSectionBuilder};

#[test]
fn transforms() -> PhotResult<()> {
    // Rotation alone
    let t = Transform::new(Point::new(0, 0), 90, false)?;
    assert_eq!(t.apply(Point::new(10, 0)), Point::new(0, 10));
    // Reflection happens before rotation
    let t = Transform::new(Point::new(0, 0), 90, true)?;
    assert_eq!(t.apply(Point::new(0, 10)), Point::new(10, 0));
    // Translation happens last
    let t = Transform::new(Point::new(100, 200), 180, false)?;
    assert_eq!(t.apply(Point::new(10, 20)), Point::new(90, 180));
    // Negative rotations normalize
    let t = Transform::new(Point::new(0, 0), -90, false)?;
    assert_eq!(t.rotation, 270);
    // And anything off-grid is rejected
    assert!(Transform::new(Point::new(0, 0), 45, false).is_err());
    Ok(())
}

#[test]
fn transform_composition() -> PhotResult<()> {
    let parent = Transform::new(Point::new(100, 0), 90, false)?;
    let child = Transform::new(Point::new(10, 0), 90, false)?;
    let composed = parent.compose(&child);
    assert_eq!(composed.rotation, 180);
    assert_eq!(composed.origin, parent.apply(child.origin));
    // Composition agrees with sequential application
    let p = Point::new(3, 4);
    assert_eq!(composed.apply(p), parent.apply(child.apply(p)));

    // A reflecting parent flips the child's rotation sense
    let parent = Transform::new(Point::new(0, 0), 0, true)?;
    let composed = parent.compose(&child);
    assert_eq!(composed.rotation, 270);
    assert!(composed.reflect);
    let p = Point::new(3, 4);
    assert_eq!(composed.apply(p), parent.apply(child.apply(p)));
    Ok(())
}

#[test]
fn port_mapping() -> PhotResult<()> {
    let port = Port::new("o2", Point::new(1000, 0), 500, 0, LayerSpec::new(1, 0));
    let t = Transform::new(Point::new(500, 500), 180, false)?;
    let mapped = port.transformed(&t);
    assert_eq!(mapped.center, Point::new(-500, 500));
    assert_eq!(mapped.orientation, 180);
    assert_eq!(mapped.width, 500);
    Ok(())
}

#[test]
fn straight_geometry() -> PhotResult<()> {
    let xs = CrossSection::strip();
    let c = crate::components::straight(10_000, &xs)?;
    assert_eq!(c.name, "straight_length10000_strip");
    assert_eq!(c.polygons.len(), 1);
    assert_eq!(
        c.polygons[0],
        Polygon::rect(LayerSpec::new(1, 0), 0, -250, 10_000, 250)
    );
    assert_eq!(c.port("o1")?.center, Point::new(0, 0));
    assert_eq!(c.port("o1")?.orientation, 180);
    assert_eq!(c.port("o2")?.center, Point::new(10_000, 0));
    assert_eq!(c.port("o2")?.orientation, 0);
    Ok(())
}

#[test]
fn mmi1x2_ports() -> PhotResult<()> {
    let xs = CrossSection::strip();
    let c = crate::components::mmi1x2(&xs)?;
    assert_eq!(c.port("o1")?.center, Point::new(0, 0));
    assert_eq!(c.port("o2")?.center, Point::new(25_500, 625));
    assert_eq!(c.port("o3")?.center, Point::new(25_500, -625));
    assert_eq!(c.port("o2")?.orientation, 0);
    assert_eq!(c.port("o3")?.orientation, 0);
    Ok(())
}

#[test]
fn mzi_connects() -> PhotResult<()> {
    let mut factory = Factory::new();
    let xs = CrossSection::strip();
    let mzi = factory.mzi(None, &xs)?;
    let mzi = mzi.read()?;
    // Splitter, two arms, combiner
    assert_eq!(mzi.refs.len(), 4);
    assert_eq!(mzi.port("o1")?.center, Point::new(0, 0));
    assert_eq!(mzi.port("o1")?.orientation, 180);
    // Combiner sits two MMI-lengths plus one arm-length out
    assert_eq!(mzi.port("o2")?.center, Point::new(61_000, 0));
    assert_eq!(mzi.port("o2")?.orientation, 0);
    Ok(())
}

#[test]
fn cache_shares_cells() -> PhotResult<()> {
    let mut factory = Factory::new();
    let xs = CrossSection::strip();
    let a = factory.straight(10_000, &xs)?;
    let b = factory.straight(10_000, &xs)?;
    // Same parameters: the identical shared cell
    assert_eq!(a, b);
    // Different parameters: a distinct cell
    let c = factory.straight(20_000, &xs)?;
    assert_ne!(a, c);
    // And a distinct cross-section is a distinct cell, too
    let wide = CrossSectionBuilder::default()
        .name("wide")
        .width(800)
        .build()
        .unwrap();
    let d = factory.straight(10_000, &wide)?;
    assert_ne!(a, d);
    Ok(())
}

#[test]
fn mzi_distinguishes_same_named_splitters() -> PhotResult<()> {
    // Two distinct splitter cells sharing a name must yield distinct MZIs
    let mut factory = Factory::new();
    let xs = CrossSection::strip();
    let wide = CrossSectionBuilder::default()
        .name("strip")
        .width(800)
        .build()
        .unwrap();
    let sa = factory.mmi1x2(&xs)?;
    let sb = factory.mmi1x2(&wide)?;
    assert_eq!(sa.read()?.name, sb.read()?.name);
    assert_ne!(sa, sb);

    let ma = factory.mzi(Some(sa.clone()), &xs)?;
    let mb = factory.mzi(Some(sb), &xs)?;
    assert_ne!(ma, mb);
    // While the same splitter cell still hits the cache
    let again = factory.mzi(Some(sa), &xs)?;
    assert_eq!(again, ma);
    Ok(())
}

#[test]
fn hash_is_parameter_sensitive() -> PhotResult<()> {
    let xs = CrossSection::strip();
    let a = crate::components::straight(10_000, &xs)?.hash_geometry()?;
    let b = crate::components::straight(10_000, &xs)?.hash_geometry()?;
    let c = crate::components::straight(10_001, &xs)?.hash_geometry()?;
    assert_eq!(a, b);
    assert_ne!(a, c);
    // A layer change alone also changes the hash
    let mut moved = crate::components::straight(10_000, &xs)?;
    moved.polygons[0].layer = LayerSpec::new(2, 0);
    assert_ne!(moved.hash_geometry()?, a);
    Ok(())
}

#[test]
fn hash_ignores_element_order() -> PhotResult<()> {
    let layer = LayerSpec::new(1, 0);
    let p1 = Polygon::rect(layer, 0, 0, 10, 10);
    let p2 = Polygon::rect(layer, 20, 0, 30, 10);
    let mut a = Component::new("a");
    a.polygons = vec![p1.clone(), p2.clone()];
    let mut b = Component::new("b");
    b.polygons = vec![p2, p1];
    assert_eq!(a.hash_geometry()?, b.hash_geometry()?);
    Ok(())
}

#[test]
fn export_orders_dependencies() -> PhotResult<()> {
    let mut factory = Factory::new();
    let xs = CrossSection::strip();
    let mzi = factory.mzi(None, &xs)?;
    let mzi = mzi.read()?;
    let lib = gds::to_gds(&mzi)?;
    // Children before parents, top last
    let names: Vec<&str> = lib.structs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.last(), Some(&"mzi_mmi1x2_strip_strip"));
    let mmi_pos = names.iter().position(|n| *n == "mmi1x2_strip");
    assert!(mmi_pos.is_some());
    // Every SREF names an already-defined struct
    let mut defined: Vec<&str> = Vec::new();
    for strukt in lib.structs.iter() {
        for elem in strukt.elems.iter() {
            if let GdsElement::GdsStructRef(sref) = elem {
                assert!(defined.contains(&sref.name.as_str()));
            }
        }
        defined.push(&strukt.name);
    }
    Ok(())
}

#[test]
fn export_renames_distinct_duplicates() -> PhotResult<()> {
    // Two *distinct* cells with the same name must land
    // under different struct names
    let layer = LayerSpec::new(1, 0);
    let mut dup1 = Component::new("dup");
    dup1.polygons.push(Polygon::rect(layer, 0, 0, 10, 10));
    let mut dup2 = Component::new("dup");
    dup2.polygons.push(Polygon::rect(layer, 0, 0, 20, 20));

    let mut top = Component::new("top");
    top.add(Ptr::new(dup1));
    top.add(Ptr::new(dup2));
    let lib = gds::to_gds(&top)?;
    let mut names: Vec<&str> = lib.structs.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["dup", "dup$1", "top"]);
    Ok(())
}

#[test]
fn export_shares_repeated_cells() -> PhotResult<()> {
    // The same cell instantiated twice is one struct, referenced twice
    let layer = LayerSpec::new(1, 0);
    let mut leaf = Component::new("leaf");
    leaf.polygons.push(Polygon::rect(layer, 0, 0, 10, 10));
    let leaf = Ptr::new(leaf);

    let mut top = Component::new("top");
    top.add(leaf.clone()).at(Point::new(0, 0));
    top.add(leaf).at(Point::new(100, 0));
    let lib = gds::to_gds(&top)?;
    assert_eq!(lib.structs.len(), 2);
    Ok(())
}

#[test]
fn to_dict_snapshots() -> PhotResult<()> {
    let mut factory = Factory::new();
    let xs = CrossSection::strip();
    let mzi = factory.mzi(None, &xs)?;
    let dict = mzi.read()?.to_dict()?;
    assert_eq!(dict["name"], "mzi_mmi1x2_strip_strip");
    assert_eq!(dict["settings"]["function"], "mzi");
    assert_eq!(dict["ports"]["o1"]["orientation"], 180);
    assert_eq!(dict["instances"].as_array().unwrap().len(), 4);
    // The flat cells map holds each descendant once
    let cells = dict["cells"].as_object().unwrap();
    assert_eq!(cells.len(), 2);
    assert!(cells.contains_key("mmi1x2_strip"));
    assert!(cells.contains_key("straight_length10000_strip"));
    Ok(())
}

#[test]
fn duplicate_ports_rejected() {
    let mut c = Component::new("c");
    let layer = LayerSpec::new(1, 0);
    c.add_port(Port::new("o1", Point::new(0, 0), 500, 180, layer))
        .unwrap();
    assert!(c
        .add_port(Port::new("o1", Point::new(10, 0), 500, 0, layer))
        .is_err());
}
