use crate::blockchain::LedgerState;
use crate::settings::CanvasSettings;

/// Render the live shapes of a derived state into an HTML snapshot, the
/// document an art app saves when it closes the canvas.
///
/// The fold over add/delete entries already happened during replay: the
/// state's live map holds exactly the shapes whose add is not followed by
/// a matching delete, and they are emitted in commit order.
pub fn render_canvas(state: &LedgerState, canvas: &CanvasSettings) -> String {
    let mut html = String::from(
        "<!DOCTYPE html PUBLIC \"-//IETF//DTD HTML 2.0//EN\"> <HTML><HEAD></HEAD><BODY> \
         <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" height=\"",
    );
    html.push_str(&canvas.canvas_y_max.to_string());
    html.push_str("\" width=\"");
    html.push_str(&canvas.canvas_x_max.to_string());
    html.push_str("\">");
    for shape in state.live_shapes_in_order() {
        html.push_str(&shape.svg_element);
    }
    html.push_str("</svg> </BODY> </HTML>");
    html
}
