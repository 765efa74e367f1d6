//! Variant planning: target pixel boxes derived from source orientation.

use shelfie_core::config::ImageConfig;
use shelfie_core::models::post::Variant;

/// A pixel box a transcoded variant must fit within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBox {
    pub width: u32,
    pub height: u32,
}

impl TargetBox {
    /// Build from a landscape-orientation `(width, height)` pair, swapping
    /// the axes for portrait sources so the longer target dimension follows
    /// the image's dominant axis.
    pub fn oriented((width, height): (u32, u32), portrait: bool) -> Self {
        if portrait {
            TargetBox {
                width: height,
                height: width,
            }
        } else {
            TargetBox { width, height }
        }
    }

    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

/// The immutable pair of target boxes for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlan {
    pub original: TargetBox,
    pub resized: TargetBox,
}

impl VariantPlan {
    /// Plan both variants for a source of the given dimensions. Square
    /// sources use the landscape reference boxes.
    pub fn for_source(width: u32, height: u32, config: &ImageConfig) -> Self {
        let portrait = height > width;
        VariantPlan {
            original: TargetBox::oriented(config.original_box, portrait),
            resized: TargetBox::oriented(config.resized_box, portrait),
        }
    }

    pub fn target_for(&self, variant: Variant) -> TargetBox {
        match variant {
            Variant::Original => self.original,
            Variant::Resized => self.resized,
        }
    }
}
