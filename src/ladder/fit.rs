use ladderd_common::Resolution;

/// Results whose aspect ratio is this close to the box are snapped to it.
pub const SNAP_TOLERANCE: f64 = 0.1;

/// Shrink `source` to fit inside `target`, keeping its aspect ratio.
///
/// Each scaled side is truncated by integer division and then rounded up to
/// an even number. If the result's aspect ratio is within [`SNAP_TOLERANCE`]
/// of the box, the box itself is returned.
///
/// A source that already fits is returned unchanged.
pub fn fit_and_snap(source: Resolution, target: Resolution) -> Resolution {
    if source.fits_within(&target) {
        return source;
    }

    let (tw, th) = (u64::from(target.width), u64::from(target.height));
    let (mut ow, mut oh) = (u64::from(source.width), u64::from(source.height));

    if ow > tw {
        oh = round_up_even(oh * tw / ow);
        ow = tw;
    }
    if oh > th {
        ow = round_up_even(ow * th / oh);
        oh = th;
    }

    let target_ratio = tw as f64 / th as f64;
    let ratio = ow as f64 / oh as f64;
    if (target_ratio - ratio).abs() < SNAP_TOLERANCE {
        return target;
    }

    Resolution::new(clamp_u32(ow), clamp_u32(oh))
}

fn round_up_even(n: u64) -> u64 {
    n + (n & 1)
}

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
