//! Height-to-color lookup for the terrain scenes.
//!
//! The 256-entry RGBA ramp is ported verbatim from the reference color map
//! (deep water blues through greens and browns up to snow white). It is
//! built into the binary, uploaded once into a uniform buffer at startup,
//! and never mutated.

/// Number of entries in the ramp.
pub const RAMP_SIZE: usize = 256;

/// Scale applied to static-terrain heights before indexing.
pub const STATIC_SCALE: f32 = 255.0;

/// Scale applied to dynamic-terrain heights before indexing.
pub const DYNAMIC_SCALE: f32 = 200.0;

/// Upper index bound used by the dynamic terrain (one below the table end).
pub const DYNAMIC_MAX_INDEX: usize = 254;

/// Map a scaled height to a ramp index: `clamp(round(h * scale), 0, max)`.
fn ramp_index(h: f32, scale: f32, max_index: usize) -> usize {
    let i = (h * scale).round();
    if i <= 0.0 {
        0
    } else {
        (i as usize).min(max_index)
    }
}

/// Color for a static-terrain height (pre-scale x255, clamp to 255).
pub fn static_color(h: f32) -> [f32; 4] {
    COLOR_RAMP[ramp_index(h, STATIC_SCALE, RAMP_SIZE - 1)]
}

/// Color for a dynamic-terrain height (pre-scale x200, clamp to 254).
///
/// The different scale and the 254 bound are site-specific constants kept
/// distinct on purpose; the two terrains do not share a mapping.
pub fn dynamic_color(h: f32) -> [f32; 4] {
    COLOR_RAMP[ramp_index(h, DYNAMIC_SCALE, DYNAMIC_MAX_INDEX)]
}

/// The ramp itself. Alpha is 1 everywhere.
#[rustfmt::skip]
pub const COLOR_RAMP: [[f32; 4]; RAMP_SIZE] = [
    [0.0, 0.6372549, 0.88823529, 1.0],
    [0.0, 0.64509804, 0.86470588, 1.0],
    [0.0, 0.65294118, 0.84117647, 1.0],
    [0.0, 0.66078431, 0.81764706, 1.0],
    [0.0, 0.66078431, 0.81764706, 1.0],
    [0.0, 0.66862745, 0.79411765, 1.0],
    [0.0, 0.67647059, 0.77058824, 1.0],
    [0.0, 0.68431373, 0.74705882, 1.0],
    [0.0, 0.69215686, 0.72352941, 1.0],
    [0.0, 0.7, 0.7, 1.0],
    [0.0, 0.7, 0.7, 1.0],
    [0.0, 0.70784314, 0.67647059, 1.0],
    [0.0, 0.71568627, 0.65294118, 1.0],
    [0.0, 0.72352941, 0.62941176, 1.0],
    [0.0, 0.73137255, 0.60588235, 1.0],
    [0.0, 0.73921569, 0.58235294, 1.0],
    [0.0, 0.73921569, 0.58235294, 1.0],
    [0.0, 0.74705882, 0.55882353, 1.0],
    [0.0, 0.75490196, 0.53529412, 1.0],
    [0.0, 0.7627451, 0.51176471, 1.0],
    [0.0, 0.77058824, 0.48823529, 1.0],
    [0.0, 0.77843137, 0.46470588, 1.0],
    [0.0, 0.77843137, 0.46470588, 1.0],
    [0.0, 0.78627451, 0.44117647, 1.0],
    [0.0, 0.79411765, 0.41764706, 1.0],
    [0.00392157, 0.80078431, 0.40078431, 1.0],
    [0.01960784, 0.80392157, 0.40392157, 1.0],
    [0.03529412, 0.80705882, 0.40705882, 1.0],
    [0.03529412, 0.80705882, 0.40705882, 1.0],
    [0.05098039, 0.81019608, 0.41019608, 1.0],
    [0.06666667, 0.81333333, 0.41333333, 1.0],
    [0.08235294, 0.81647059, 0.41647059, 1.0],
    [0.09803922, 0.81960784, 0.41960784, 1.0],
    [0.11372549, 0.8227451, 0.4227451, 1.0],
    [0.11372549, 0.8227451, 0.4227451, 1.0],
    [0.12941176, 0.82588235, 0.42588235, 1.0],
    [0.14509804, 0.82901961, 0.42901961, 1.0],
    [0.16078431, 0.83215686, 0.43215686, 1.0],
    [0.17647059, 0.83529412, 0.43529412, 1.0],
    [0.19215686, 0.83843137, 0.43843137, 1.0],
    [0.19215686, 0.83843137, 0.43843137, 1.0],
    [0.20784314, 0.84156863, 0.44156863, 1.0],
    [0.22352941, 0.84470588, 0.44470588, 1.0],
    [0.23921569, 0.84784314, 0.44784314, 1.0],
    [0.25490196, 0.85098039, 0.45098039, 1.0],
    [0.27058824, 0.85411765, 0.45411765, 1.0],
    [0.28627451, 0.8572549, 0.4572549, 1.0],
    [0.28627451, 0.8572549, 0.4572549, 1.0],
    [0.30196078, 0.86039216, 0.46039216, 1.0],
    [0.31764706, 0.86352941, 0.46352941, 1.0],
    [0.33333333, 0.86666667, 0.46666667, 1.0],
    [0.34901961, 0.86980392, 0.46980392, 1.0],
    [0.36470588, 0.87294118, 0.47294118, 1.0],
    [0.36470588, 0.87294118, 0.47294118, 1.0],
    [0.38039216, 0.87607843, 0.47607843, 1.0],
    [0.39607843, 0.87921569, 0.47921569, 1.0],
    [0.41176471, 0.88235294, 0.48235294, 1.0],
    [0.42745098, 0.8854902, 0.4854902, 1.0],
    [0.44313725, 0.88862745, 0.48862745, 1.0],
    [0.44313725, 0.88862745, 0.48862745, 1.0],
    [0.45882353, 0.89176471, 0.49176471, 1.0],
    [0.4745098, 0.89490196, 0.49490196, 1.0],
    [0.49019608, 0.89803922, 0.49803922, 1.0],
    [0.50588235, 0.90117647, 0.50117647, 1.0],
    [0.52156863, 0.90431373, 0.50431373, 1.0],
    [0.52156863, 0.90431373, 0.50431373, 1.0],
    [0.5372549, 0.90745098, 0.50745098, 1.0],
    [0.55294118, 0.91058824, 0.51058824, 1.0],
    [0.56862745, 0.91372549, 0.51372549, 1.0],
    [0.58431373, 0.91686275, 0.51686275, 1.0],
    [0.6, 0.92, 0.52, 1.0],
    [0.6, 0.92, 0.52, 1.0],
    [0.61568627, 0.92313725, 0.52313725, 1.0],
    [0.63137255, 0.92627451, 0.52627451, 1.0],
    [0.64705882, 0.92941176, 0.52941176, 1.0],
    [0.6627451, 0.93254902, 0.53254902, 1.0],
    [0.67843137, 0.93568627, 0.53568627, 1.0],
    [0.67843137, 0.93568627, 0.53568627, 1.0],
    [0.69411765, 0.93882353, 0.53882353, 1.0],
    [0.70980392, 0.94196078, 0.54196078, 1.0],
    [0.7254902, 0.94509804, 0.54509804, 1.0],
    [0.74117647, 0.94823529, 0.54823529, 1.0],
    [0.75686275, 0.95137255, 0.55137255, 1.0],
    [0.75686275, 0.95137255, 0.55137255, 1.0],
    [0.77254902, 0.9545098, 0.5545098, 1.0],
    [0.78823529, 0.95764706, 0.55764706, 1.0],
    [0.80392157, 0.96078431, 0.56078431, 1.0],
    [0.81960784, 0.96392157, 0.56392157, 1.0],
    [0.83529412, 0.96705882, 0.56705882, 1.0],
    [0.83529412, 0.96705882, 0.56705882, 1.0],
    [0.85098039, 0.97019608, 0.57019608, 1.0],
    [0.86666667, 0.97333333, 0.57333333, 1.0],
    [0.88235294, 0.97647059, 0.57647059, 1.0],
    [0.89803922, 0.97960784, 0.57960784, 1.0],
    [0.91372549, 0.9827451, 0.5827451, 1.0],
    [0.91372549, 0.9827451, 0.5827451, 1.0],
    [0.92941176, 0.98588235, 0.58588235, 1.0],
    [0.94509804, 0.98901961, 0.58901961, 1.0],
    [0.96078431, 0.99215686, 0.59215686, 1.0],
    [0.97647059, 0.99529412, 0.59529412, 1.0],
    [0.99215686, 0.99843137, 0.59843137, 1.0],
    [0.99607843, 0.99498039, 0.59788235, 1.0],
    [0.99607843, 0.99498039, 0.59788235, 1.0],
    [0.98823529, 0.98494118, 0.59364706, 1.0],
    [0.98039216, 0.97490196, 0.58941176, 1.0],
    [0.97254902, 0.96486275, 0.58517647, 1.0],
    [0.96470588, 0.95482353, 0.58094118, 1.0],
    [0.95686275, 0.94478431, 0.57670588, 1.0],
    [0.95686275, 0.94478431, 0.57670588, 1.0],
    [0.94901961, 0.9347451, 0.57247059, 1.0],
    [0.94117647, 0.92470588, 0.56823529, 1.0],
    [0.93333333, 0.91466667, 0.564, 1.0],
    [0.9254902, 0.90462745, 0.55976471, 1.0],
    [0.91764706, 0.89458824, 0.55552941, 1.0],
    [0.91764706, 0.89458824, 0.55552941, 1.0],
    [0.90980392, 0.88454902, 0.55129412, 1.0],
    [0.90196078, 0.8745098, 0.54705882, 1.0],
    [0.89411765, 0.86447059, 0.54282353, 1.0],
    [0.88627451, 0.85443137, 0.53858824, 1.0],
    [0.87843137, 0.84439216, 0.53435294, 1.0],
    [0.87843137, 0.84439216, 0.53435294, 1.0],
    [0.87058824, 0.83435294, 0.53011765, 1.0],
    [0.8627451, 0.82431373, 0.52588235, 1.0],
    [0.85490196, 0.81427451, 0.52164706, 1.0],
    [0.84705882, 0.80423529, 0.51741176, 1.0],
    [0.83921569, 0.79419608, 0.51317647, 1.0],
    [0.83921569, 0.79419608, 0.51317647, 1.0],
    [0.83137255, 0.78415686, 0.50894118, 1.0],
    [0.82352941, 0.77411765, 0.50470588, 1.0],
    [0.81568627, 0.76407843, 0.50047059, 1.0],
    [0.80784314, 0.75403922, 0.49623529, 1.0],
    [0.8, 0.744, 0.492, 1.0],
    [0.8, 0.744, 0.492, 1.0],
    [0.79215686, 0.73396078, 0.48776471, 1.0],
    [0.78431373, 0.72392157, 0.48352941, 1.0],
    [0.77647059, 0.71388235, 0.47929412, 1.0],
    [0.76862745, 0.70384314, 0.47505882, 1.0],
    [0.76078431, 0.69380392, 0.47082353, 1.0],
    [0.76078431, 0.69380392, 0.47082353, 1.0],
    [0.75294118, 0.68376471, 0.46658824, 1.0],
    [0.74509804, 0.67372549, 0.46235294, 1.0],
    [0.7372549, 0.66368627, 0.45811765, 1.0],
    [0.72941176, 0.65364706, 0.45388235, 1.0],
    [0.72156863, 0.64360784, 0.44964706, 1.0],
    [0.72156863, 0.64360784, 0.44964706, 1.0],
    [0.71372549, 0.63356863, 0.44541176, 1.0],
    [0.70588235, 0.62352941, 0.44117647, 1.0],
    [0.69803922, 0.6134902, 0.43694118, 1.0],
    [0.69019608, 0.60345098, 0.43270588, 1.0],
    [0.68235294, 0.59341176, 0.42847059, 1.0],
    [0.6745098, 0.58337255, 0.42423529, 1.0],
    [0.6745098, 0.58337255, 0.42423529, 1.0],
    [0.66666667, 0.57333333, 0.42, 1.0],
    [0.65882353, 0.56329412, 0.41576471, 1.0],
    [0.65098039, 0.5532549, 0.41152941, 1.0],
    [0.64313725, 0.54321569, 0.40729412, 1.0],
    [0.63529412, 0.53317647, 0.40305882, 1.0],
    [0.63529412, 0.53317647, 0.40305882, 1.0],
    [0.62745098, 0.52313725, 0.39882353, 1.0],
    [0.61960784, 0.51309804, 0.39458824, 1.0],
    [0.61176471, 0.50305882, 0.39035294, 1.0],
    [0.60392157, 0.49301961, 0.38611765, 1.0],
    [0.59607843, 0.48298039, 0.38188235, 1.0],
    [0.59607843, 0.48298039, 0.38188235, 1.0],
    [0.58823529, 0.47294118, 0.37764706, 1.0],
    [0.58039216, 0.46290196, 0.37341176, 1.0],
    [0.57254902, 0.45286275, 0.36917647, 1.0],
    [0.56470588, 0.44282353, 0.36494118, 1.0],
    [0.55686275, 0.43278431, 0.36070588, 1.0],
    [0.55686275, 0.43278431, 0.36070588, 1.0],
    [0.54901961, 0.4227451, 0.35647059, 1.0],
    [0.54117647, 0.41270588, 0.35223529, 1.0],
    [0.53333333, 0.40266667, 0.348, 1.0],
    [0.5254902, 0.39262745, 0.34376471, 1.0],
    [0.51764706, 0.38258824, 0.33952941, 1.0],
    [0.51764706, 0.38258824, 0.33952941, 1.0],
    [0.50980392, 0.37254902, 0.33529412, 1.0],
    [0.50196078, 0.3625098, 0.33105882, 1.0],
    [0.50588235, 0.36752941, 0.33788235, 1.0],
    [0.51372549, 0.37756863, 0.34839216, 1.0],
    [0.52156863, 0.38760784, 0.35890196, 1.0],
    [0.52156863, 0.38760784, 0.35890196, 1.0],
    [0.52941176, 0.39764706, 0.36941176, 1.0],
    [0.5372549, 0.40768627, 0.37992157, 1.0],
    [0.54509804, 0.41772549, 0.39043137, 1.0],
    [0.55294118, 0.42776471, 0.40094118, 1.0],
    [0.56078431, 0.43780392, 0.41145098, 1.0],
    [0.56078431, 0.43780392, 0.41145098, 1.0],
    [0.56862745, 0.44784314, 0.42196078, 1.0],
    [0.57647059, 0.45788235, 0.43247059, 1.0],
    [0.58431373, 0.46792157, 0.44298039, 1.0],
    [0.59215686, 0.47796078, 0.4534902, 1.0],
    [0.6, 0.488, 0.464, 1.0],
    [0.6, 0.488, 0.464, 1.0],
    [0.60784314, 0.49803922, 0.4745098, 1.0],
    [0.61568627, 0.50807843, 0.48501961, 1.0],
    [0.62352941, 0.51811765, 0.49552941, 1.0],
    [0.63137255, 0.52815686, 0.50603922, 1.0],
    [0.63921569, 0.53819608, 0.51654902, 1.0],
    [0.63921569, 0.53819608, 0.51654902, 1.0],
    [0.64705882, 0.54823529, 0.52705882, 1.0],
    [0.65490196, 0.55827451, 0.53756863, 1.0],
    [0.6627451, 0.56831373, 0.54807843, 1.0],
    [0.67058824, 0.57835294, 0.55858824, 1.0],
    [0.67843137, 0.58839216, 0.56909804, 1.0],
    [0.68627451, 0.59843137, 0.57960784, 1.0],
    [0.68627451, 0.59843137, 0.57960784, 1.0],
    [0.69411765, 0.60847059, 0.59011765, 1.0],
    [0.70196078, 0.6185098, 0.60062745, 1.0],
    [0.70980392, 0.62854902, 0.61113725, 1.0],
    [0.71764706, 0.63858824, 0.62164706, 1.0],
    [0.7254902, 0.64862745, 0.63215686, 1.0],
    [0.7254902, 0.64862745, 0.63215686, 1.0],
    [0.73333333, 0.65866667, 0.64266667, 1.0],
    [0.74117647, 0.66870588, 0.65317647, 1.0],
    [0.74901961, 0.6787451, 0.66368627, 1.0],
    [0.75686275, 0.68878431, 0.67419608, 1.0],
    [0.76470588, 0.69882353, 0.68470588, 1.0],
    [0.76470588, 0.69882353, 0.68470588, 1.0],
    [0.77254902, 0.70886275, 0.69521569, 1.0],
    [0.78039216, 0.71890196, 0.70572549, 1.0],
    [0.78823529, 0.72894118, 0.71623529, 1.0],
    [0.79607843, 0.73898039, 0.7267451, 1.0],
    [0.80392157, 0.74901961, 0.7372549, 1.0],
    [0.80392157, 0.74901961, 0.7372549, 1.0],
    [0.81176471, 0.75905882, 0.74776471, 1.0],
    [0.81960784, 0.76909804, 0.75827451, 1.0],
    [0.82745098, 0.77913725, 0.76878431, 1.0],
    [0.83529412, 0.78917647, 0.77929412, 1.0],
    [0.84313725, 0.79921569, 0.78980392, 1.0],
    [0.84313725, 0.79921569, 0.78980392, 1.0],
    [0.85098039, 0.8092549, 0.80031373, 1.0],
    [0.85882353, 0.81929412, 0.81082353, 1.0],
    [0.86666667, 0.82933333, 0.82133333, 1.0],
    [0.8745098, 0.83937255, 0.83184314, 1.0],
    [0.88235294, 0.84941176, 0.84235294, 1.0],
    [0.88235294, 0.84941176, 0.84235294, 1.0],
    [0.89019608, 0.85945098, 0.85286275, 1.0],
    [0.89803922, 0.8694902, 0.86337255, 1.0],
    [0.90588235, 0.87952941, 0.87388235, 1.0],
    [0.91372549, 0.88956863, 0.88439216, 1.0],
    [0.92156863, 0.89960784, 0.89490196, 1.0],
    [0.92156863, 0.89960784, 0.89490196, 1.0],
    [0.92941176, 0.90964706, 0.90541176, 1.0],
    [0.9372549, 0.91968627, 0.91592157, 1.0],
    [0.94509804, 0.92972549, 0.92643137, 1.0],
    [0.95294118, 0.93976471, 0.93694118, 1.0],
    [0.96078431, 0.94980392, 0.94745098, 1.0],
    [0.96078431, 0.94980392, 0.94745098, 1.0],
    [0.96862745, 0.95984314, 0.95796078, 1.0],
    [0.97647059, 0.96988235, 0.96847059, 1.0],
    [0.98431373, 0.97992157, 0.97898039, 1.0],
    [0.99215686, 0.98996078, 0.9894902, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_has_256_entries() {
        assert_eq!(COLOR_RAMP.len(), RAMP_SIZE);
    }

    #[test]
    fn test_ramp_alpha_is_one() {
        assert!(COLOR_RAMP.iter().all(|c| c[3] == 1.0));
    }

    #[test]
    fn test_ramp_channels_in_unit_range() {
        for c in &COLOR_RAMP {
            for &ch in c {
                assert!((0.0..=1.0).contains(&ch));
            }
        }
    }

    #[test]
    fn test_lookup_always_returns_table_entry() {
        for &h in &[-5.0f32, -0.01, 0.0, 0.3, 0.999, 1.0, 2.0, 100.0] {
            let c = static_color(h);
            assert!(COLOR_RAMP.contains(&c));
            let c = dynamic_color(h);
            assert!(COLOR_RAMP.contains(&c));
        }
    }

    #[test]
    fn test_lookup_is_idempotent() {
        for &h in &[0.0f32, 0.42, 0.77, 1.3] {
            assert_eq!(static_color(h), static_color(h));
            assert_eq!(dynamic_color(h), dynamic_color(h));
        }
    }

    #[test]
    fn test_lookup_clamps_low_and_high() {
        assert_eq!(static_color(-1.0), COLOR_RAMP[0]);
        assert_eq!(static_color(10.0), COLOR_RAMP[255]);
        assert_eq!(dynamic_color(-1.0), COLOR_RAMP[0]);
        // The dynamic site never reads past index 254.
        assert_eq!(dynamic_color(10.0), COLOR_RAMP[254]);
    }

    #[test]
    fn test_site_scales_differ() {
        // h = 0.5 indexes 128 on the static site but 100 on the dynamic one.
        assert_eq!(static_color(0.5), COLOR_RAMP[128]);
        assert_eq!(dynamic_color(0.5), COLOR_RAMP[100]);
    }

    #[test]
    fn test_low_end_is_water_blue_high_end_is_snow_white() {
        let low = COLOR_RAMP[0];
        assert!(low[2] > low[0], "index 0 should be blue-dominant");
        let high = COLOR_RAMP[255];
        assert_eq!(&high[..3], &[1.0, 1.0, 1.0]);
    }
}
