/// Template matching implementation
///
/// Zero-mean normalized cross-correlation over grayscale images. The raw
/// sliding products come from imageproc; window means and energies come from
/// summed-area tables so every placement is normalized in constant time.
use super::types::MatchResult;
use crate::error::{ClickerError, ClickerResult};
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::template_matching::{MatchTemplateMethod, match_template};

/// Score per top-left placement, `(W - w + 1) x (H - h + 1)`
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Pixel count and integer moments of a grayscale patch
#[derive(Clone, Copy, Debug)]
struct Moments {
    n: i128,
    sum: i128,
    sum_sq: i128,
}

impl Moments {
    /// `n * sum(v^2) - sum(v)^2`, zero exactly when the patch is flat
    fn spread(&self) -> i128 {
        self.n * self.sum_sq - self.sum * self.sum
    }
}

/// Summed-area tables of pixel values and squared pixel values
struct IntegralTables {
    stride: usize,
    sums: Vec<u64>,
    squares: Vec<u64>,
}

impl IntegralTables {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        let mut squares = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = image.get_pixel(x as u32, y as u32)[0] as u64;
                row_sum += v;
                row_sq += v * v;
                let i = (y + 1) * stride + x + 1;
                sums[i] = sums[i - stride] + row_sum;
                squares[i] = squares[i - stride] + row_sq;
            }
        }
        Self {
            stride,
            sums,
            squares,
        }
    }

    fn window(&self, x: u32, y: u32, width: u32, height: u32) -> Moments {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + width as usize, y0 + height as usize);
        let area = |t: &[u64]| {
            let at = |xx: usize, yy: usize| t[yy * self.stride + xx];
            at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1)
        };
        Moments {
            n: width as i128 * height as i128,
            sum: area(&self.sums) as i128,
            sum_sq: area(&self.squares) as i128,
        }
    }
}

/// Score for flat windows or flat templates, where correlation is undefined.
/// Two flat patches of the same level are identical, anything else is unrelated.
fn flat_score(window: &Moments, template: &Moments) -> Option<f32> {
    let window_flat = window.spread() == 0;
    let template_flat = template.spread() == 0;
    if !window_flat && !template_flat {
        return None;
    }
    if window_flat && template_flat && window.sum == template.sum {
        Some(1.0)
    } else {
        Some(0.0)
    }
}

/// Reference image prepared for repeated matching
#[derive(Clone, Debug)]
pub struct TemplateMatcher {
    gray: GrayImage,
    moments: Moments,
}

impl TemplateMatcher {
    pub fn new(template: &RgbImage) -> Self {
        Self::from_gray(image::imageops::grayscale(template))
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let moments = IntegralTables::new(&gray).window(0, 0, w, h);
        Self { gray, moments }
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    fn check_dimensions(&self, image: &GrayImage) -> ClickerResult<()> {
        let (tw, th) = self.gray.dimensions();
        if tw == 0 || th == 0 || tw > image.width() || th > image.height() {
            return Err(ClickerError::DimensionMismatch {
                template_width: tw,
                template_height: th,
                region_width: image.width(),
                region_height: image.height(),
            });
        }
        Ok(())
    }

    /// Correlation score for every placement of the template in `image`.
    pub fn score_map(&self, image: &GrayImage) -> ClickerResult<ScoreMap> {
        self.check_dimensions(image)?;
        let (tw, th) = self.gray.dimensions();
        let tables = IntegralTables::new(image);
        let template_spread = self.moments.spread() as f64;

        let mut scores = match_template(image, &self.gray, MatchTemplateMethod::CrossCorrelation);
        for (x, y, pixel) in scores.enumerate_pixels_mut() {
            let window = tables.window(x, y, tw, th);
            let cross = pixel[0] as f64;
            pixel[0] = match flat_score(&window, &self.moments) {
                Some(score) => score,
                None => {
                    let n = window.n as f64;
                    let numerator = n * cross - window.sum as f64 * self.moments.sum as f64;
                    let denominator = (window.spread() as f64 * template_spread).sqrt();
                    (numerator / denominator).clamp(-1.0, 1.0) as f32
                }
            };
        }
        Ok(scores)
    }

    /// Recompute the score at one placement in integer arithmetic, so a
    /// pixel-exact (or brightness-shifted) copy scores exactly 1.0.
    fn exact_score(&self, image: &GrayImage, x: u32, y: u32) -> f32 {
        let (tw, th) = self.gray.dimensions();
        let window = IntegralTables::new(&image::imageops::crop_imm(image, x, y, tw, th).to_image())
            .window(0, 0, tw, th);
        if let Some(score) = flat_score(&window, &self.moments) {
            return score;
        }

        let mut cross: i128 = 0;
        for (tx, ty, t) in self.gray.enumerate_pixels() {
            cross += image.get_pixel(x + tx, y + ty)[0] as i128 * t[0] as i128;
        }
        let numerator = window.n * cross - window.sum * self.moments.sum;
        let spread_product = window.spread() * self.moments.spread();
        if numerator > 0 && numerator * numerator == spread_product {
            return 1.0;
        }
        let denominator = (window.spread() as f64).sqrt() * (self.moments.spread() as f64).sqrt();
        (numerator as f64 / denominator).clamp(-1.0, 1.0) as f32
    }

    /// Best placement of the template in `image`, gated by `threshold`.
    /// Ties resolve to the first placement in raster order.
    pub fn find_gray(&self, image: &GrayImage, threshold: f32) -> ClickerResult<MatchResult> {
        let scores = self.score_map(image)?;

        let mut best = (0u32, 0u32);
        let mut max_score = f32::NEG_INFINITY;
        for (x, y, pixel) in scores.enumerate_pixels() {
            if pixel[0] > max_score {
                max_score = pixel[0];
                best = (x, y);
            }
        }

        let score = self.exact_score(image, best.0, best.1);
        Ok(MatchResult {
            found: score >= threshold,
            center: (best.0 + self.width() / 2, best.1 + self.height() / 2),
            top_left: best,
            score,
        })
    }

    pub fn find(&self, image: &RgbImage, threshold: f32) -> ClickerResult<MatchResult> {
        self.find_gray(&image::imageops::grayscale(image), threshold)
    }
}

/// Match `template` against `image`; both are reduced to intensity first.
pub fn find_match(image: &RgbImage, template: &RgbImage, threshold: f32) -> ClickerResult<MatchResult> {
    TemplateMatcher::new(template).find(image, threshold)
}

/// Full score surface, mostly useful for threshold tuning.
pub fn correlation_surface(image: &RgbImage, template: &RgbImage) -> ClickerResult<ScoreMap> {
    TemplateMatcher::new(template).score_map(&image::imageops::grayscale(image))
}
