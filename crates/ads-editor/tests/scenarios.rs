//! Integration tests: the worked scenarios from the designer's behavior
//! contract — default frame geometry, cover-fit branch selection, fit
//! padding, and stack relocation.

use ads_canvas::{CanvasSurface, MemSurface, Viewport};
use ads_core::fonts::{FontInventory, FontVariant};
use ads_core::id::LayerId;
use ads_core::model::{DesignSize, ImageData, LayerKind, Ratio, TextAlign};
use ads_core::vars::{TextVariable, VariableCatalog};
use ads_editor::autofit::FitConfig;
use ads_editor::session::{DesignSession, LayerInit, LayerPatch, TextPatch};

const VIEWPORT: Viewport = Viewport {
    width: 1000.0,
    height: 800.0,
};

fn make_session() -> DesignSession<MemSurface> {
    let mut session = DesignSession::new(DesignSize::Wide);
    let mut fonts = FontInventory::new();
    fonts.insert("Inter", &[FontVariant::Regular, FontVariant::Bold]);
    session.set_fonts(fonts);

    let mut vars = VariableCatalog::new();
    vars.insert(
        "headline",
        TextVariable {
            label: "Headline".into(),
            value: "Certified pre-owned, fully serviced".into(),
            formatting: Default::default(),
        },
    );
    session.set_variables(vars);
    session.set_photos(
        vec![ImageData::new("car_square.jpg", 640.0, 640.0)],
        Ratio::new(16, 9),
    );
    session.attach_surface(MemSurface::new(VIEWPORT));
    session
}

// ─── Scenario A: frame geometry and cover-fit branch ────────────────────

#[test]
fn new_frame_derives_geometry_from_canvas_and_photo_ratio() {
    let mut session = make_session();
    let frame = session.add_layer(LayerInit::Frame).unwrap();

    let LayerKind::Frame(f) = &session.template().get(frame).unwrap().kind else {
        panic!("expected frame");
    };
    // 30% of the 1000-wide canvas, height locked to the 16:9 photo ratio.
    assert_eq!(f.width, 300.0);
    assert!((f.height - 168.75).abs() < 1e-9);
}

#[test]
fn square_image_in_wide_frame_takes_the_height_branch() {
    let mut session = make_session();
    let frame = session.add_layer(LayerInit::Frame).unwrap();
    session.update_layer(frame, LayerPatch::Frame { image_index: Some(0) });

    let sync = session.sync().unwrap();
    let attached = sync.attached_for(frame).unwrap();
    let img = sync.surface().state(attached.image).unwrap();

    // containerAspect (1.778) > imageAspect (1.0) ⇒ scale fills the
    // height: containerHeight / imageHeight, uniform on both axes.
    let expected = 168.75 / 640.0;
    assert!((img.placement.scale_y - expected).abs() < 1e-9);
    assert_eq!(img.placement.scale_x, img.placement.scale_y);
}

// ─── Scenario B: fit padding for bold + right alignment ─────────────────

#[test]
fn bold_right_aligned_text_fits_against_the_narrowed_width() {
    let mut session = make_session();
    let text = session
        .add_layer(LayerInit::Text {
            variable: Some("headline".into()),
            font_family: Some("Inter".into()),
        })
        .unwrap();
    session.update_layer(
        text,
        LayerPatch::Text(TextPatch {
            bold: Some(true),
            align: Some(TextAlign::Right),
            fixed_width: Some(300.0),
            fixed_height: Some(100.0),
            ..TextPatch::default()
        }),
    );

    let LayerKind::Text(t) = &session.template().get(text).unwrap().kind else {
        panic!("expected text layer");
    };

    // bold ⇒ pad 8, right ⇒ extra 5: probes run at width 279, height 84.
    let cfg = FitConfig::default();
    let probe_width = cfg.probe_width(300.0, true, TextAlign::Right);
    assert_eq!(probe_width, 279.0);
    let allowed = cfg.allowed_height(100.0, true);

    let content = "Certified pre-owned, fully serviced";
    let mut expected = f64::from(cfg.min_size);
    for size in cfg.min_size..=cfg.max_size {
        if MemSurface::text_block_height(content, f64::from(size), probe_width) <= allowed {
            expected = f64::from(size);
        }
    }
    assert_eq!(t.font_size, expected);

    // The replica keeps the full box width for final wrapping.
    let sync = session.sync().unwrap();
    let obj = sync.object_for(text).unwrap();
    assert_eq!(sync.surface().state(obj).unwrap().width, 300.0);
}

// ─── Scenario C: single-element relocation ──────────────────────────────

#[test]
fn move_layer_relocates_and_repaints() {
    let mut session = make_session();
    let image = ImageData::new("any.png", 100.0, 100.0);
    // Build [A, B, C, D] top→bottom by adding D first.
    let d = session
        .add_layer(LayerInit::Picture { image: image.clone() })
        .unwrap();
    let c = session
        .add_layer(LayerInit::Picture { image: image.clone() })
        .unwrap();
    let b = session
        .add_layer(LayerInit::Picture { image: image.clone() })
        .unwrap();
    let a = session.add_layer(LayerInit::Picture { image }).unwrap();

    session.move_layer(2, 0);

    let order: Vec<LayerId> = session.template().layers.iter().map(|l| l.id).collect();
    assert_eq!(order, vec![c, a, b, d]);

    // Canvas paints bottom→top: D, B, A, C.
    let painted = session.sync().unwrap().painted_layers();
    assert_eq!(painted, vec![d, b, a, c]);
}
