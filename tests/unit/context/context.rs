use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::core::Point;
use crate::foundation::error::RotoError;

#[derive(Default)]
struct CountingRenderer {
    calls: Arc<AtomicUsize>,
}

impl MaskRenderer for CountingRenderer {
    fn render(&self, shapes: &[ShapeSample], target: &RenderTarget) -> RotoResult<MaskImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ScanlineRenderer::new().render(shapes, target)
    }
}

fn counting_context() -> (RotoContext, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = CountingRenderer {
        calls: Arc::clone(&calls),
    };
    (
        RotoContext::with_renderer(Box::new(renderer), RenderConfig::default()),
        calls,
    )
}

fn add_square(ctx: &RotoContext) -> ItemId {
    let id = ctx.create_bezier(None).unwrap();
    ctx.edit_shape(id, |shape, policy| {
        for (x, y) in [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)] {
            shape.add_control_point(x, y, Frame(0), policy)?;
        }
        shape.set_finished(true);
        Ok(())
    })
    .unwrap();
    id
}

#[test]
fn edits_bump_age_once_and_flags_do_not() {
    let ctx = RotoContext::new();
    assert_eq!(ctx.age(), 0);
    let id = ctx.create_layer(None).unwrap();
    assert_eq!(ctx.age(), 1);

    ctx.edit(|s| {
        s.create_bezier(Some(id))?;
        s.create_bezier(Some(id))
    })
    .unwrap();
    assert_eq!(ctx.age(), 2);

    ctx.set_ripple_edit_enabled(true);
    ctx.set_selection(&[id]).unwrap();
    assert!(ctx.is_ripple_edit_enabled());
    assert_eq!(ctx.age(), 2);
}

#[test]
fn failed_edit_leaves_state_untouched() {
    let ctx = RotoContext::new();
    let shape = ctx.create_bezier(None).unwrap();
    let err = ctx
        .edit(|s| {
            s.create_layer(None)?;
            s.create_layer(Some(shape))
        })
        .unwrap_err();
    assert!(matches!(err, RotoError::Contract(_)));
    assert_eq!(ctx.age(), 1);
    ctx.read(|s| {
        assert_eq!(s.tree().len(), 1);
        assert_eq!(s.item_counter("Layer"), 0);
    });
}

#[test]
fn failed_shape_edit_leaves_the_shape_untouched() {
    let ctx = RotoContext::new();
    let id = add_square(&ctx);
    let age = ctx.age();
    let err = ctx
        .edit_shape(id, |shape, policy| {
            shape.move_control_point_by_index(0, Frame(0), 5.0, 5.0, policy)?;
            shape.add_control_point(9.0, 9.0, Frame(0), policy)
        })
        .unwrap_err();
    assert!(matches!(err, RotoError::InvalidOperation(_)));
    assert_eq!(ctx.age(), age);
    ctx.read(|s| {
        let shape = s.shape(id).unwrap();
        assert_eq!(shape.control_points().len(), 4);
        assert_eq!(
            shape.control_point(0).unwrap().position_at(Frame(0)),
            Point::new(2.0, 2.0)
        );
    });

    ctx.edit_shape(id, |shape, policy| {
        shape.move_control_point_by_index(0, Frame(0), 1.0, 0.0, policy)
    })
    .unwrap();
    assert_eq!(ctx.age(), age + 1);
}

#[test]
fn repeated_request_hits_the_memo() {
    let (ctx, calls) = counting_context();
    add_square(&ctx);
    let viewport = Viewport::from_size(8, 8).unwrap();

    let first = ctx.get_or_render_mask(Frame(0), 0, viewport).unwrap();
    let second = ctx.get_or_render_mask(Frame(0), 0, viewport).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.cache_stats(), CacheStats { hits: 1, misses: 1 });
    assert_eq!(first.value_at(4, 4), Some(1.0));
    assert_eq!(first.value_at(0, 0), Some(0.0));

    ctx.get_or_render_mask(Frame(1), 0, viewport).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn edits_and_replacement_invalidate_the_memo() {
    let (ctx, calls) = counting_context();
    let id = add_square(&ctx);
    let viewport = Viewport::from_size(8, 8).unwrap();
    ctx.get_or_render_mask(Frame(0), 0, viewport).unwrap();

    ctx.edit_shape(id, |shape, _| {
        shape.knob_mut(ShapeKnob::Opacity).set_value(0.5)
    })
    .unwrap();
    let dimmed = ctx.get_or_render_mask(Frame(0), 0, viewport).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!((dimmed.value_at(4, 4).unwrap() - 0.5).abs() < 1e-6);

    let before = ctx.age();
    ctx.replace_state(RotoState::new());
    assert!(ctx.age() > before);
    let empty = ctx.get_or_render_mask(Frame(0), 0, viewport).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(empty.data().iter().all(|v| *v == 0.0));
}

#[test]
fn locked_shapes_cannot_be_edited_through_the_context() {
    let ctx = RotoContext::new();
    let id = add_square(&ctx);
    ctx.set_item_locked(id, true).unwrap();
    let err = ctx
        .edit_shape(id, |shape, _| {
            shape.set_finished(false);
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, RotoError::InvalidOperation(_)));
    assert!(ctx.read(|s| s.shape(id).unwrap().is_finished()));
}
