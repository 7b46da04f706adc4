use crate::color::Color;
use crate::elements::{BorderWidth, CornerRadius, ElementDeclaration};
use crate::id::Id;
use crate::math::BoundingBox;
use crate::solver::PaintStep;
use crate::text::FontId;

/// Represents a rectangle with a specified color and corner radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    /// The fill color of the rectangle.
    pub color: Color,
    /// The corner radii for rounded edges.
    pub corner_radii: CornerRadius,
}

/// Represents a text element with styling attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// The text content.
    pub text: String,
    /// The color of the text.
    pub color: Color,
    /// The ID of the font used.
    pub font_id: FontId,
    /// The font size.
    pub font_size: f64,
    /// The spacing between letters.
    pub letter_spacing: f64,
    /// The line height. `0` means the font's own.
    pub line_height: f64,
}

/// Represents a border with a specified color, width, and corner radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    /// The border color.
    pub color: Color,
    /// The corner radii for rounded border edges.
    pub corner_radii: CornerRadius,
    /// The width of the border on each side.
    pub width: BorderWidth,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommandConfig {
    Rectangle(Rectangle),
    Border(Border),
    Text(Text),
    /// Everything up to the matching `ScissorEnd` is clipped to the command's
    /// bounding box, which is already intersected with any enclosing scissor.
    ScissorStart(),
    ScissorEnd(),
}

/// Represents a render command for drawing an element on the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    /// The bounding box defining the area occupied by the element.
    pub bounding_box: BoundingBox,
    /// The specific configuration for rendering this command.
    pub config: RenderCommandConfig,
    /// Identity of the element that produced the command.
    pub id: Id,
    /// The z-index the element was declared with.
    pub z_index: i16,
}

/// Turns a paint walk into primitives, using each element's eased style.
/// Backgrounds and text are emitted before children, borders after them.
pub(crate) fn generate<'d>(
    steps: &[PaintStep],
    rects: &[BoundingBox],
    element: impl Fn(usize) -> (Id, &'d ElementDeclaration),
) -> Vec<RenderCommand> {
    let mut commands = Vec::new();
    for step in steps {
        match *step {
            PaintStep::Open { index, clip } => {
                let (id, declaration) = element(index);
                let bounding_box = rects[index];
                let z_index = declaration.layout.z_index;
                let mut push = |config| {
                    commands.push(RenderCommand {
                        bounding_box,
                        config,
                        id,
                        z_index,
                    })
                };

                if !declaration.background_color.is_transparent() {
                    push(RenderCommandConfig::Rectangle(Rectangle {
                        color: declaration.background_color,
                        corner_radii: declaration.corner_radius,
                    }));
                }
                if let Some(text) = &declaration.text {
                    if let Some(font_id) = text.config.font_id {
                        push(RenderCommandConfig::Text(Text {
                            text: text.content.clone(),
                            color: text.config.color,
                            font_id,
                            font_size: text.config.font_size,
                            letter_spacing: text.config.letter_spacing,
                            line_height: text.config.line_height,
                        }));
                    }
                }
                if declaration.layout.clip {
                    let scissor = clip.map_or(bounding_box, |outer| outer.intersect(&bounding_box));
                    commands.push(RenderCommand {
                        bounding_box: scissor,
                        config: RenderCommandConfig::ScissorStart(),
                        id,
                        z_index,
                    });
                }
            }
            PaintStep::Close { index } => {
                let (id, declaration) = element(index);
                let bounding_box = rects[index];
                let z_index = declaration.layout.z_index;
                if declaration.layout.clip {
                    commands.push(RenderCommand {
                        bounding_box,
                        config: RenderCommandConfig::ScissorEnd(),
                        id,
                        z_index,
                    });
                }
                let border = &declaration.border;
                if !border.width.is_zero() && !border.color.is_transparent() {
                    commands.push(RenderCommand {
                        bounding_box,
                        config: RenderCommandConfig::Border(Border {
                            color: border.color,
                            corner_radii: declaration.corner_radius,
                            width: border.width,
                        }),
                        id,
                        z_index,
                    });
                }
            }
        }
    }
    commands
}
