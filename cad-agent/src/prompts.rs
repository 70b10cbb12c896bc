//! Default prompts and the A3 sheet preamble the drawing code is built on.

/// Phrases that mark an analysis as a request for more information.
pub const CLARIFICATION_MARKERS: [&str; 4] = ["could you", "please provide", "what is", "clarify"];

/// Marker line after which authored drawing code is appended.
pub const DRAWING_SECTION_MARKER: &str = "# ========== DRAWING SECTION - EDIT BELOW ==========";

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert engineering analyst specializing in \
mechanical, structural, and civil engineering. Your role is to:

1. Understand engineering problems from natural language descriptions
2. Ask clarifying questions when requirements are unclear or incomplete
3. Perform detailed engineering analysis (stress, deflection, thermal, etc.)
4. Provide clear explanations of your analysis and assumptions
5. Generate detailed specifications for CAD drawings

When a user describes an engineering problem:
- Ask for missing critical parameters (dimensions, materials, loads, boundary conditions)
- State your assumptions clearly
- Show relevant calculations
- Explain the engineering reasoning
- Provide a clear specification for the drawing

Be conversational but technically precise. Keep responses focused and actionable.";

pub const CODE_GEN_SYSTEM_PROMPT: &str = r#"You are an expert Python programmer specializing in the ezdxf CAD generation package. Your role is to generate production-quality Python code that creates DXF drawings.

CRITICAL REQUIREMENTS:
1. **NEVER create a new document** - doc and msp are ALREADY defined in the template
2. **NEVER import ezdxf or other modules** - all imports are ALREADY done
3. **NEVER create or define layers** - all layers are ALREADY defined
4. **ONLY generate drawing commands** - lines, polylines, circles, dimensions, text, etc.
5. Use the pre-defined DRAWING_AREA constants for positioning
6. Use the pre-defined layers (M-VISIBLE, M-HIDDEN, M-CENTER, DIMENSIONS, TEXT, etc.)
7. Add dimensions to all critical features
8. Include annotations and labels
9. Use proper engineering drawing standards

Available constants (ALREADY DEFINED):
- doc: ezdxf document (ALREADY CREATED)
- msp: modelspace (ALREADY DEFINED)
- DRAWING_AREA['centerX'], DRAWING_AREA['centerY']: Center of drawing area
- DRAWING_AREA['width'], DRAWING_AREA['height']: Available drawing space
- TextEntityAlignment: ALREADY IMPORTED
- math module: You CAN import this if needed

Available layers (ALREADY CREATED):
- M-VISIBLE, M-HIDDEN, M-CENTER, M-SECTION, M-HATCH
- DIMENSIONS, TEXT, NOTES, LEADERS, SYMBOLS, TABLES

Example drawing code (CORRECT):
```python
import math

radius = 100
arc_points = []
for i in range(51):
    angle = math.pi * i / 50
    x = DRAWING_AREA['centerX'] + radius * math.cos(angle)
    y = DRAWING_AREA['centerY'] + radius * math.sin(angle)
    arc_points.append((x, y))

msp.add_lwpolyline(arc_points, dxfattribs={'layer': 'M-VISIBLE'})

dim = msp.add_linear_dim(
    base=(DRAWING_AREA['centerX'], DRAWING_AREA['centerY'] - 50),
    p1=(DRAWING_AREA['centerX'] - radius, DRAWING_AREA['centerY']),
    p2=(DRAWING_AREA['centerX'] + radius, DRAWING_AREA['centerY']),
    dimstyle='ISO-25',
    dxfattribs={'layer': 'DIMENSIONS'}
)

text = msp.add_text(
    f"RADIUS = {radius} mm",
    dxfattribs={'layer': 'TEXT', 'height': 3}
)
text.set_placement((DRAWING_AREA['centerX'], DRAWING_AREA['centerY'] + radius + 20), align=TextEntityAlignment.MIDDLE_CENTER)
```

WRONG EXAMPLE (DO NOT DO THIS):
```python
import ezdxf  # WRONG - already imported
doc = ezdxf.new('R2010')  # WRONG - doc already exists
msp = doc.modelspace()  # WRONG - msp already exists
doc.layers.add("M-VISIBLE", color=7)  # WRONG - layers already defined
```

Generate ONLY the drawing commands. No document creation. No layer definitions. Production-ready code."#;

pub const DESIGN_SUMMARY_SYSTEM_PROMPT: &str = r#"You are a professional engineering design writer. Your role is to create concise, professional design summaries for CAD drawings.

Given an engineering analysis and design description, create a structured design summary in JSON format with:

1. **title**: A short, descriptive title (max 60 chars)
2. **description**: A brief 1-2 sentence description of what the design is
3. **dimensions**: Array of key dimensions, each with:
   - label: What the dimension measures
   - value: The dimension value with units (e.g., "150 mm", "45°")
4. **rationale**: 2-3 sentences explaining how this design solves the user's problem

Guidelines:
- Be concise and professional
- Use engineering terminology appropriately
- Focus on key specifications and dimensions
- Format dimensions consistently with units

Return ONLY valid JSON in this exact format:
```json
{
  "title": "Design Title",
  "description": "Brief description",
  "dimensions": [
    {"label": "Dimension Name", "value": "Value with unit"}
  ],
  "rationale": "Why this design works"
}
```"#;

pub const IMAGE_PROMPTS_SYSTEM_PROMPT: &str = r#"ROLE
You craft precise, production-grade image prompts for engineering and design. Given an engineering analysis text, output 5 prompts describing the SAME design from distinct, professional views.

SCOPE & FILTERING
- Extract ONLY geometry, proportions, and materials from the analysis.
- EXCLUDE forces, loads, boundary conditions, FEA legends, commentary, and unrelated text.
- Keep backgrounds plain and neutral unless the view requires context.

VIEWS (in this order)
1) Isometric: CAD-style isometric, shaded with visible edges, white background.
2) Engineering sketch: clean hand-drafted sketch of the design on white paper.
3) Front view: orthographic front view, clean CAD linework on white background.
4) Top view: orthographic top view, clean CAD linework on white background.
5) 3D rendering: photoreal render with materials and studio lighting.

WRITING RULES
- Write in plain English, as descriptive as possible, so the image model does not assume details.
- No annotations, dimensions, numbers, or other text in the images.

OUTPUT FORMAT (STRICT)
Return ONLY a JSON array with exactly 5 strings, in the view order above:
```json
[
  "Prompt for isometric view",
  "Prompt for engineering sketch",
  "Prompt for front view",
  "Prompt for top view",
  "Prompt for 3D rendering"
]
```"#;

/// Preamble for an A3 (420x297 mm) sheet: units, linetypes, styles, layers,
/// border, title block, general notes and revision table.
pub const DRAWING_PREAMBLE: &str = r#""""PROFESSIONAL DXF TEMPLATE - A3 SHEET (420x297mm)
Edit only the DRAWING SECTION at the bottom
"""

import ezdxf
from ezdxf.enums import TextEntityAlignment
from datetime import date

doc = ezdxf.new("R2018")
doc.units = ezdxf.units.MM
doc.header["$MEASUREMENT"] = 1

# ========== SHEET SETUP ==========
SHEET = {
    'width': 420,
    'height': 297,
    'margin': 10,
    'titleblock_height': 50,
    'notes_width': 120,
    'revtable_width': 90
}

DRAWING_AREA = {
    'minX': SHEET['margin'] + SHEET['notes_width'] + 10,
    'maxX': SHEET['width'] - SHEET['margin'] - SHEET['revtable_width'] - 10,
    'minY': SHEET['margin'] + SHEET['titleblock_height'] + 10,
    'maxY': SHEET['height'] - SHEET['margin'] - 10
}
DRAWING_AREA['width'] = DRAWING_AREA['maxX'] - DRAWING_AREA['minX']
DRAWING_AREA['height'] = DRAWING_AREA['maxY'] - DRAWING_AREA['minY']
DRAWING_AREA['centerX'] = DRAWING_AREA['minX'] + DRAWING_AREA['width'] / 2
DRAWING_AREA['centerY'] = DRAWING_AREA['minY'] + DRAWING_AREA['height'] / 2

# ========== LINETYPES ==========
doc.linetypes.add("HIDDEN", pattern=[5, -2.5])
doc.linetypes.add("CENTER", pattern=[12.5, -2.5, 2.5, -2.5])
doc.linetypes.add("PHANTOM", pattern=[12.5, -2.5, 2.5, -2.5, 2.5, -2.5])

# ========== TEXT STYLES ==========
doc.styles.add("TITLE", font="arial.ttf")
doc.styles.add("SUBTITLE", font="arial.ttf")
doc.styles.add("ANNOTATION", font="arial.ttf")
doc.styles.add("DIMENSION", font="arial.ttf")
doc.styles.add("NOTES", font="arial.ttf")

# ========== DIMENSION STYLES ==========
dimstyle = doc.dimstyles.new("ISO-25")
dimstyle.dxf.dimtxsty = "DIMENSION"
dimstyle.dxf.dimtxt = 2
dimstyle.dxf.dimasz = 2

# ========== LAYERS ==========
doc.layers.add("M-OUTL", color=7, linetype="CONTINUOUS")
doc.layers.add("M-VISIBLE", color=7, linetype="CONTINUOUS")
doc.layers.add("M-HIDDEN", color=2, linetype="HIDDEN")
doc.layers.add("M-CENTER", color=4, linetype="CENTER")
doc.layers.add("M-SECTION", color=1, linetype="PHANTOM")
doc.layers.add("M-HATCH", color=8, linetype="CONTINUOUS")
doc.layers.add("DIMENSIONS", color=4, linetype="CONTINUOUS")
doc.layers.add("TEXT", color=7, linetype="CONTINUOUS")
doc.layers.add("NOTES", color=2, linetype="CONTINUOUS")
doc.layers.add("LEADERS", color=4, linetype="CONTINUOUS")
doc.layers.add("SYMBOLS", color=7, linetype="CONTINUOUS")
doc.layers.add("TABLES", color=7, linetype="CONTINUOUS")
doc.layers.add("TITLEBLOCK", color=7, linetype="CONTINUOUS")
doc.layers.add("BORDER", color=7, linetype="CONTINUOUS")

# ========== BLOCKS ==========
sec_mark = doc.blocks.new("SECTION_MARK")
sec_mark.add_circle((0, 0), 8, dxfattribs={'layer': 'SYMBOLS'})
sec_mark.add_line((-12, 0), (-8, 0), dxfattribs={'layer': 'SYMBOLS'})
sec_mark.add_line((8, 0), (12, 0), dxfattribs={'layer': 'SYMBOLS'})

det_circle = doc.blocks.new("DETAIL_CIRCLE")
det_circle.add_circle((0, 0), 10, dxfattribs={'layer': 'SYMBOLS'})

# ========== FIXED ELEMENTS ==========
msp = doc.modelspace()

msp.add_lwpolyline([
    (SHEET['margin'], SHEET['margin']),
    (SHEET['width'] - SHEET['margin'], SHEET['margin']),
    (SHEET['width'] - SHEET['margin'], SHEET['height'] - SHEET['margin']),
    (SHEET['margin'], SHEET['height'] - SHEET['margin']),
    (SHEET['margin'], SHEET['margin'])
], dxfattribs={'layer': 'BORDER'})

TB = {
    'x': SHEET['margin'],
    'y': SHEET['margin'],
    'width': SHEET['width'] - 2 * SHEET['margin'],
    'height': SHEET['titleblock_height']
}

msp.add_lwpolyline([
    (TB['x'], TB['y']),
    (TB['x'] + TB['width'], TB['y']),
    (TB['x'] + TB['width'], TB['y'] + TB['height']),
    (TB['x'], TB['y'] + TB['height']),
    (TB['x'], TB['y'])
], dxfattribs={'layer': 'TITLEBLOCK'})

msp.add_line((TB['x'], TB['y'] + 15), (TB['x'] + TB['width'], TB['y'] + 15), dxfattribs={'layer': 'TITLEBLOCK'})
msp.add_line((TB['x'], TB['y'] + 30), (TB['x'] + TB['width'], TB['y'] + 30), dxfattribs={'layer': 'TITLEBLOCK'})
msp.add_line((TB['x'] + TB['width'] * 0.6, TB['y']), (TB['x'] + TB['width'] * 0.6, TB['y'] + 30), dxfattribs={'layer': 'TITLEBLOCK'})
msp.add_line((TB['x'] + TB['width'] * 0.8, TB['y']), (TB['x'] + TB['width'] * 0.8, TB['y'] + 30), dxfattribs={'layer': 'TITLEBLOCK'})

msp.add_text("AI ENGINEERING DESIGN", dxfattribs={'layer': 'TITLEBLOCK', 'style': 'SUBTITLE', 'height': 3}).set_placement((TB['x'] + 5, TB['y'] + TB['height'] - 7), align=TextEntityAlignment.LEFT)
msp.add_text("AUTOMATED CAD GENERATION", dxfattribs={'layer': 'TITLEBLOCK', 'style': 'TITLE', 'height': 3.5}).set_placement((TB['x'] + 5, TB['y'] + 32), align=TextEntityAlignment.LEFT)
msp.add_text("DWG NO: AUTO-GEN-001", dxfattribs={'layer': 'TITLEBLOCK', 'height': 2.5}).set_placement((TB['x'] + 5, TB['y'] + 18), align=TextEntityAlignment.LEFT)
msp.add_text("SCALE: 1:1", dxfattribs={'layer': 'TITLEBLOCK', 'height': 2}).set_placement((TB['x'] + 5, TB['y'] + 3), align=TextEntityAlignment.LEFT)
msp.add_text(f"DATE: {date.today()}", dxfattribs={'layer': 'TITLEBLOCK', 'height': 2}).set_placement((TB['x'] + TB['width'] * 0.8 + 5, TB['y'] + 18), align=TextEntityAlignment.LEFT)

NOTES = {
    'x': SHEET['margin'] + 5,
    'y': TB['y'] + TB['height'] + 10
}

msp.add_text("GENERAL NOTES:", dxfattribs={'layer': 'NOTES', 'style': 'ANNOTATION', 'height': 2.5}).set_placement((NOTES['x'], NOTES['y'] + 100), align=TextEntityAlignment.LEFT)
notes_list = ["1. ALL DIMS IN MM", "2. AUTO-GENERATED", "3. VERIFY DESIGN", "4. CHECK STANDARDS"]
for i, note in enumerate(notes_list):
    msp.add_text(note, dxfattribs={'layer': 'NOTES', 'style': 'NOTES', 'height': 1.8}).set_placement((NOTES['x'], NOTES['y'] + 95 - i * 5), align=TextEntityAlignment.LEFT)

REV = {
    'x': SHEET['width'] - SHEET['margin'] - SHEET['revtable_width'],
    'y': TB['y'] + TB['height'] + 10,
    'width': SHEET['revtable_width'],
    'height': 40
}

msp.add_text("REVISIONS", dxfattribs={'layer': 'TABLES', 'style': 'ANNOTATION', 'height': 2.5}).set_placement((REV['x'], REV['y'] + REV['height'] + 3), align=TextEntityAlignment.LEFT)
msp.add_lwpolyline([
    (REV['x'], REV['y']),
    (REV['x'] + REV['width'], REV['y']),
    (REV['x'] + REV['width'], REV['y'] + REV['height']),
    (REV['x'], REV['y'] + REV['height']),
    (REV['x'], REV['y'])
], dxfattribs={'layer': 'TABLES'})

# ========== DRAWING SECTION - EDIT BELOW =========="#;

/// The authoring request sent for an analysis.
#[must_use]
pub fn authoring_prompt(analysis: &str, language: &str) -> String {
    format!(
        "Based on this engineering analysis, generate {language} code using ezdxf to create the \
         CAD drawing.

Analysis:
{analysis}

Requirements:
- Add code ONLY after the \"{DRAWING_SECTION_MARKER}\" line
- Use DRAWING_AREA constants for positioning
- Include all dimensions
- Add proper annotations and labels
- Use appropriate layers
- Generate complete, production-ready code

Return ONLY the {language} code to add after the drawing section marker, wrapped in \
```{tag} blocks.",
        tag = language.to_lowercase(),
    )
}

#[must_use]
pub fn design_summary_prompt(analysis: &str) -> String {
    format!("Create a design summary for this engineering design:\n\n{analysis}")
}

#[must_use]
pub fn image_prompts_prompt(analysis: &str) -> String {
    format!("analysisText:\n{analysis}")
}

/// Prompt for a single view when the assistant's prompt list is unusable.
#[must_use]
pub fn fallback_image_prompt(view_label: &str, analysis: &str) -> String {
    format!(
        "{view_label} of the following engineering design, clean professional style on a plain \
         white background, no text or dimensions: {analysis}"
    )
}
