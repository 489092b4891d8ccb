//! Card composition
//!
//! Turns one person record into one card plan per usable question. All cards
//! of a record share the photo fit, the handle and the stat; only the caption
//! differs.

use crate::geometry::{CoverFit, fit};
use crate::options::CardOptions;
use crate::plan::{CompositionOp, CompositionPlan, ExportFormat, ImageSource, Layer};
use crate::stats::{StatSource, compute_stat};
use crate::types::*;
use crate::wrap::{WrappedText, wrap};
use std::path::PathBuf;

/// Gender to template mapping. Unknown genders fall back to the male template.
pub fn resolve_template(gender: Gender) -> TemplateKind {
    match gender {
        Gender::Female => TemplateKind::Female,
        Gender::Male | Gender::Unknown => TemplateKind::Male,
    }
}

/// Everything that varies between two cards.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlan {
    pub template: TemplateKind,
    pub photo_fit: CoverFit,
    pub stat: u32,
    /// Display form, e.g. `@someone`
    pub handle_text: String,
    /// Question the card was built for, trimmed
    pub question: String,
    pub caption_lines: WrappedText,
}

impl CardPlan {
    /// Caption text as printed, label included.
    pub fn caption_text(&self, label: &str) -> String {
        format!("{}{}", label, self.caption_lines.joined())
    }

    /// Raster operations producing this card at `output`.
    ///
    /// Order: template, photo (resize, crop, composite into the frame), stat,
    /// handle, caption, export.
    pub fn composition(
        &self,
        options: &CardOptions,
        photo: ImageSource,
        output: impl Into<PathBuf>,
    ) -> CompositionPlan {
        let fit = &self.photo_fit;
        let mut plan = CompositionPlan::new();
        plan.push(CompositionOp::Open {
            layer: Layer::Base,
            source: ImageSource::File(options.templates.path_for(self.template).to_path_buf()),
        })
        .push(CompositionOp::Open {
            layer: Layer::Overlay,
            source: photo,
        })
        .push(CompositionOp::Resize {
            layer: Layer::Overlay,
            width: fit.scaled_width,
            height: fit.scaled_height,
        })
        .push(CompositionOp::Crop {
            layer: Layer::Overlay,
            x: fit.offset_x,
            y: fit.offset_y,
            width: fit.crop_width,
            height: fit.crop_height,
        })
        .push(CompositionOp::Composite {
            x: options.frame.x,
            y: options.frame.y,
        })
        .push(CompositionOp::Annotate {
            text: self.stat.to_string(),
            style: options.stat_style.clone(),
        })
        .push(CompositionOp::Annotate {
            text: self.handle_text.clone(),
            style: options.handle_style.clone(),
        })
        .push(CompositionOp::Annotate {
            text: self.caption_text(&options.caption.label),
            style: options.caption.style.clone(),
        })
        .push(CompositionOp::Export {
            path: output.into(),
            format: ExportFormat::Png,
        });
        plan
    }
}

/// Build the card plans for `record`, whose first photo measures `photo`.
///
/// Blank questions are skipped. A record without usable questions yields no
/// plans and draws no stat.
pub fn build_plans(
    record: &PersonRecord,
    photo: Rectangle,
    options: &CardOptions,
    stats: &mut impl StatSource,
) -> Result<Vec<CardPlan>> {
    let photo_fit = fit(photo, options.frame.size())?;

    let questions: Vec<&str> = record.usable_questions().collect();
    if questions.is_empty() {
        return Ok(Vec::new());
    }

    let template = resolve_template(record.gender);
    let stat = compute_stat(&record.handle, &options.stats, stats);
    let handle_text = record.display_handle();

    log::debug!(
        "{}: photo {}x{} -> {}x{} crop +{}+{}, stat {}",
        handle_text,
        photo.width,
        photo.height,
        photo_fit.scaled_width,
        photo_fit.scaled_height,
        photo_fit.offset_x,
        photo_fit.offset_y,
        stat
    );

    Ok(questions
        .into_iter()
        .map(|question| CardPlan {
            template,
            photo_fit,
            stat,
            handle_text: handle_text.clone(),
            question: question.to_string(),
            caption_lines: wrap(question, options.caption.max_chars_per_line),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RandomStats;

    fn record(questions: &[&str]) -> PersonRecord {
        PersonRecord {
            handle: "@Someone".to_string(),
            photos: vec![PhotoRef {
                url: "https://example.com/a.jpg".to_string(),
            }],
            gender: Gender::Female,
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_template() {
        assert_eq!(resolve_template(Gender::Male), TemplateKind::Male);
        assert_eq!(resolve_template(Gender::Female), TemplateKind::Female);
        assert_eq!(resolve_template(Gender::Unknown), TemplateKind::Male);
    }

    #[test]
    fn test_two_questions_share_photo_and_stat() {
        let options = CardOptions::default();
        let mut stats = RandomStats::seeded(1);
        let plans = build_plans(
            &record(&["What is your dream job?", "", "Cats or dogs?"]),
            Rectangle::new(3024.0, 4032.0),
            &options,
            &mut stats,
        )
        .unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].photo_fit, plans[1].photo_fit);
        assert_eq!(plans[0].stat, plans[1].stat);
        assert_ne!(plans[0].caption_lines, plans[1].caption_lines);
        assert_eq!(plans[0].handle_text, "@someone");
        assert_eq!(plans[0].template, TemplateKind::Female);
    }

    #[test]
    fn test_no_questions_no_plans() {
        let options = CardOptions::default();
        let mut stats = RandomStats::seeded(1);
        let plans =
            build_plans(&record(&["", "  "]), Rectangle::new(10.0, 10.0), &options, &mut stats)
                .unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn test_invalid_photo_dimensions() {
        let options = CardOptions::default();
        let mut stats = RandomStats::seeded(1);
        let result = build_plans(&record(&["Q?"]), Rectangle::new(0.0, 10.0), &options, &mut stats);
        assert!(matches!(result, Err(CardError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_composition_order_and_geometry() {
        let options = CardOptions::default();
        let mut stats = RandomStats::seeded(3);
        let plans = build_plans(
            &record(&["Favourite song?"]),
            Rectangle::new(1000.0, 2000.0),
            &options,
            &mut stats,
        )
        .unwrap();

        let plan = plans[0].composition(&options, ImageSource::File("photo.jpg".into()), "out.png");
        let ops = &plan.ops;
        assert_eq!(ops.len(), 9);
        assert!(matches!(&ops[0], CompositionOp::Open { layer: Layer::Base, source: ImageSource::File(p) } if p.ends_with("card_template_female.png")));
        assert_eq!(
            ops[2],
            CompositionOp::Resize {
                layer: Layer::Overlay,
                width: 740,
                height: 1480
            }
        );
        assert_eq!(
            ops[3],
            CompositionOp::Crop {
                layer: Layer::Overlay,
                x: 0,
                y: 470,
                width: 740,
                height: 540
            }
        );
        assert_eq!(ops[4], CompositionOp::Composite { x: 115, y: 167 });
        match &ops[7] {
            CompositionOp::Annotate { text, .. } => assert_eq!(text, "Question: Favourite song?"),
            other => panic!("unexpected op {other:?}"),
        }
        assert_eq!(plan.output(), Some(&PathBuf::from("out.png")));
    }
}
